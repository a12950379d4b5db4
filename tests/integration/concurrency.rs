//! One compiled template rendered from many threads.

use std::sync::Arc;
use std::thread;

use templite::test_utils::sample_context;
use templite::{Context, Templite, filters};

#[test]
fn test_shared_template_renders_concurrently() {
    let templite = Arc::new(
        Templite::with_contexts(
            "{{ user.name|upper }}#{{ n }}:{% for l in user.langs %}{{ l|first }}{% endfor %}",
            [filters::builtins(), sample_context()],
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let templite = Arc::clone(&templite);
            thread::spawn(move || {
                let context = Context::new().with("n", i);
                (0..50)
                    .map(|_| templite.render(Some(&context)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let outputs = handle.join().unwrap();
        let expected = format!("ADA#{i}:rp");
        assert!(outputs.iter().all(|out| *out == expected), "thread {i} diverged");
    }
}

#[test]
fn test_scoped_threads_borrow_template() {
    let templite = Templite::new("{% if flag %}on{% endif %}").unwrap();
    let results: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = [true, false, true]
            .into_iter()
            .map(|flag| {
                let templite = &templite;
                scope.spawn(move || templite.render(Some(&Context::new().with("flag", flag))).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results, vec!["on", "", "on"]);
}
