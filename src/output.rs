//! High-visibility console warning blocks.
//!
//! Failure paths surface to the user through a bordered block that is hard
//! to miss in a scrollback full of installer output. Styling is applied by
//! the `console` crate, which already accounts for NO_COLOR and non-tty
//! output.

use console::Style;

const BORDER_CHAR: char = '!';
const BORDER_WIDTH: usize = 3;
const PADDING: usize = 1;

/// Text alignment inside a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

/// Print a bordered warning block, centered.
pub fn warning(lines: &[&str]) {
    warning_aligned(lines, Alignment::Center);
}

/// Print a bordered warning block with explicit alignment.
pub fn warning_aligned(lines: &[&str], alignment: Alignment) {
    let style = Style::new().yellow().on_red().bold();
    for line in format_block(lines, alignment) {
        println!("{}", style.apply_to(line));
    }
}

/// Build the unstyled lines of a block. Kept pure so the geometry is
/// testable without a terminal.
pub fn format_block(lines: &[&str], alignment: Alignment) -> Vec<String> {
    let content_width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let padded_width = content_width + 2 * PADDING;

    let side = BORDER_CHAR.to_string().repeat(BORDER_WIDTH);
    let border = BORDER_CHAR.to_string().repeat(padded_width + 2 * BORDER_WIDTH);
    let blank = format!("{side}{}{side}", " ".repeat(padded_width));

    let mut block = vec![border.clone(), blank.clone()];
    for line in lines {
        let len = line.chars().count();
        let padded = match alignment {
            Alignment::Left => {
                format!("{}{line}{}", " ".repeat(PADDING), " ".repeat(padded_width - len - PADDING))
            }
            Alignment::Center => {
                let total = padded_width - len;
                let left = total / 2;
                format!("{}{line}{}", " ".repeat(left), " ".repeat(total - left))
            }
        };
        block.push(format!("{side}{padded}{side}"));
    }
    block.push(blank);
    block.push(border);
    block
}
