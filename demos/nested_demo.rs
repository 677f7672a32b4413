//! Nested Demo: a sub-stream gating its parent.
//!
//! The parent reveals "before" text, then parks on a nested typewriter
//! element until the child instance finishes revealing its own content,
//! then resumes with the "after" text. The child's own completion hook is
//! preserved and fires before the parent advances.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};
use typewriter::{CompletionHook, Node, Rendered, StreamOptions, Typewriter};

fn content() -> Node {
    let child_options = StreamOptions::default()
        .with_speed(1)
        .with_interval(Duration::from_millis(20))
        .with_on_complete(CompletionHook::new(|| {
            // Invoked by the child before the parent resumes.
            print!(" [child done] ");
            let _ = io::stdout().flush();
        }));

    Node::list(vec![
        Node::text("Parent streaming... "),
        Node::stream_with(
            vec![Node::text("(nested: every token here gates the parent) ")],
            child_options,
        ),
        Node::text("...parent resumed and finished."),
    ])
}

/// Print only what changed since the last frame, teletype style.
fn print_progress(previous: &mut String, current: &str) -> io::Result<()> {
    if let Some(suffix) = current.strip_prefix(previous.as_str()) {
        print!("{suffix}");
    } else {
        print!("\n{current}");
    }
    *previous = current.to_string();
    io::stdout().flush()
}

fn combined_text(parent: &Typewriter, child: Option<&Typewriter>) -> String {
    let mut out = String::new();
    for slot in parent.state().rendered.values() {
        match slot {
            Rendered::Text(text) => out.push_str(text),
            Rendered::Node(_) => {
                if let Some(child) = child {
                    out.push_str(&child.rendered_text());
                }
            }
        }
    }
    out
}

fn main() -> io::Result<()> {
    let options = StreamOptions::default()
        .with_speed(1)
        .with_interval(Duration::from_millis(20));
    let mut parent = Typewriter::new(options);
    parent.sync(&content());

    let mut child: Option<Typewriter> = None;
    let mut shown = String::new();

    while !parent.is_complete() {
        parent.pump();

        // The view layer mounts the child once its slot appears.
        if parent.state().waiting_nested && child.is_none() {
            let unit = parent.state().unit_index;
            if let Some(element) = parent.state().rendered[&unit]
                .as_node()
                .and_then(Node::as_element)
            {
                let (mut instance, tree) = Typewriter::from_element(parent.id().child(unit), element);
                instance.sync(&tree);
                child = Some(instance);
            }
        }
        if let Some(instance) = child.as_mut() {
            instance.pump();
        }

        print_progress(&mut shown, &combined_text(&parent, child.as_ref()))?;

        let deadline = [
            parent.next_due(),
            child.as_ref().and_then(Typewriter::next_due),
        ]
        .into_iter()
        .flatten()
        .min();
        if let Some(due) = deadline {
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
        }
    }

    print_progress(&mut shown, &combined_text(&parent, child.as_ref()))?;
    println!("\n[parent complete]");
    Ok(())
}
