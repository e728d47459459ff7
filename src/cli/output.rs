use console::{style, Color};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::time::Duration;

pub const SEPARATOR: &str = "--------------------";

pub struct OutputFormatter {
    use_colors: bool,
}

/// Stderr spinner shown while a request is outstanding. Hidden when stderr
/// is not a terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(
                spinner_style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", ""]),
            );
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    pub fn stop(self) {
        self.bar.finish_and_clear();
    }
}

impl OutputFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn format_calling(&self) -> String {
        "✨ Kernel is calling local Ollama...".to_string()
    }

    pub fn format_configured(&self, model_id: &str) -> String {
        format!(
            "✅ Kernel configured for model: {}",
            self.style_text(model_id, Color::Cyan)
        )
    }

    pub fn format_invoking(&self) -> String {
        "\n🚀 Invoking the prompt...".to_string()
    }

    /// Header, separator, reply, separator. The reply is printed verbatim.
    pub fn format_response(&self, response: &str) -> String {
        format!(
            "\n{}\n{SEPARATOR}\n{response}\n{SEPARATOR}",
            self.style_text("🎉 Ollama's Response:", Color::Green)
        )
    }

    pub fn format_error(&self, message: &str) -> String {
        format!("{} {}", self.style_text("Error:", Color::Red), message)
    }

    pub fn format_success(&self, message: &str) -> String {
        format!("{} {}", self.style_text("✓", Color::Green), message)
    }

    pub fn format_failure(&self, message: &str) -> String {
        format!("{} {}", self.style_text("✗", Color::Red), message)
    }

    pub fn format_warning(&self, message: &str) -> String {
        format!("{} {}", self.style_text("⚠", Color::Yellow), message)
    }

    fn style_text(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            style(text).fg(color).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Blocks until a key is pressed. Returns immediately when stdin is not a
/// terminal.
pub fn wait_for_key_press() -> io::Result<()> {
    if !io::stdin().is_terminal() {
        return Ok(());
    }

    enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };
    disable_raw_mode()?;

    result
}
