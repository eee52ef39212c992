//! Colored terminal projection of the transcript.

use chrono::Local;
use colored::Colorize;
use helpline_core::connectivity::ConnectivityState;
use helpline_core::message::{Message, MessageOrigin, MessageRole};
use helpline_core::transcript::{Transcript, TranscriptRenderer, TypingToken};
use rustyline::ExternalPrinter;

/// Destination for rendered lines.
pub trait LineSink: Send {
    fn write_line(&mut self, line: String);
}

/// Writes straight to stdout.
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&mut self, line: String) {
        println!("{}", line);
    }
}

/// Prints above the active prompt so output never garbles the input line.
pub struct PromptSink<P> {
    printer: P,
}

impl<P: ExternalPrinter + Send> PromptSink<P> {
    pub fn new(printer: P) -> Self {
        Self { printer }
    }
}

impl<P: ExternalPrinter + Send> LineSink for PromptSink<P> {
    fn write_line(&mut self, line: String) {
        if let Err(e) = self.printer.print(line.clone()) {
            tracing::debug!("[Renderer] External printer failed: {}", e);
            println!("{}", line);
        }
    }
}

impl LineSink for Box<dyn LineSink> {
    fn write_line(&mut self, line: String) {
        (**self).write_line(line);
    }
}

/// Prints each transcript change and keeps a `Transcript` for the bookkeeping.
pub struct TerminalRenderer<S> {
    sink: S,
    transcript: Transcript,
}

impl<S: LineSink> TerminalRenderer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            transcript: Transcript::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn print_message(&mut self, message: &Message) {
        match (message.origin, message.role) {
            (MessageOrigin::LocalEcho, _) | (_, MessageRole::User) => {
                for line in message.content.lines() {
                    self.sink.write_line(format!("> {}", line).green().to_string());
                }
            }
            (MessageOrigin::Synthetic, _) => {
                self.sink.write_line(header(message));
                self.sink.write_line(message.content.red().to_string());
            }
            (MessageOrigin::Server, _) => {
                self.sink.write_line(header(message));
                for line in message.content.lines() {
                    self.sink.write_line(line.bright_blue().to_string());
                }
            }
        }
    }
}

/// `[Assistant] 14:02`, in local time.
fn header(message: &Message) -> String {
    format!(
        "{} {}",
        format!("[{}]", message.role.label()).bright_magenta(),
        message
            .received_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
            .bright_black()
    )
}

impl<S: LineSink> TranscriptRenderer for TerminalRenderer<S> {
    fn append(&mut self, message: Message) {
        self.print_message(&message);
        self.transcript.append(message);
    }

    fn show_typing(&mut self) -> TypingToken {
        let was_typing = self.transcript.is_typing();
        let token = self.transcript.show_typing();
        if !was_typing {
            self.sink
                .write_line("assistant is typing...".bright_black().italic().to_string());
        }
        token
    }

    fn hide_typing(&mut self, token: TypingToken) -> bool {
        self.transcript.hide_typing(token)
    }

    fn set_connectivity_badge(&mut self, state: ConnectivityState) {
        self.transcript.set_connectivity_badge(state);
        let badge = format!("● {}", state.label());
        let badge = match state {
            ConnectivityState::Online => badge.green(),
            ConnectivityState::Offline => badge.red(),
            ConnectivityState::Unknown => badge.bright_black(),
        };
        self.sink.write_line(badge.to_string());
    }
}
