//! Typewriter Demo: progressive reveal of a small content tree.
//!
//! Streams a few paragraphs word by word, rendering an instant divider
//! node the moment its turn arrives. Run with `RUST_LOG=typewriter=debug`
//! to watch resets and unit starts.

use crossterm::{
    cursor,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};
use typewriter::{ComponentId, ComponentRef, Node, Rendered, StreamOptions, Typewriter};

fn content() -> Node {
    Node::list(vec![
        Node::text("The typewriter engine reveals a content tree over time: "),
        Node::text("text is paced token by token through a cancellation-safe scheduler, "),
        Node::text("while opaque nodes render in full the instant their turn arrives."),
        Node::element(ComponentRef::direct(ComponentId::new("Divider")), vec![]),
        Node::text("A changed tree restarts the run; a re-render that only swaps "),
        Node::text("node identity does not."),
    ])
}

/// Map computed state onto a printable string (the view layer's job).
fn render(tw: &Typewriter) -> String {
    let mut out = String::new();
    for slot in tw.state().rendered.values() {
        match slot {
            Rendered::Text(text) => out.push_str(text),
            Rendered::Node(_) => out.push_str("\n--------\n"),
        }
    }
    out
}

fn redraw(stdout: &mut io::Stdout, tw: &Typewriter) -> io::Result<()> {
    execute!(stdout, cursor::MoveTo(0, 0), Clear(ClearType::FromCursorDown))?;
    write!(stdout, "{}", render(tw))?;
    stdout.flush()
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let options = StreamOptions::default()
        .with_speed(1)
        .with_interval(Duration::from_millis(30));
    let mut tw = Typewriter::new(options);
    tw.sync(&content());

    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All))?;

    while !tw.is_complete() {
        tw.pump();
        redraw(&mut stdout, &tw)?;

        let Some(due) = tw.next_due() else { break };
        let now = Instant::now();
        if due > now {
            thread::sleep(due - now);
        }
    }

    redraw(&mut stdout, &tw)?;
    writeln!(stdout, "\n\n[complete]")?;
    Ok(())
}
