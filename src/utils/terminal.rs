//! Terminal output sanitization
//!
//! Entry names and payload text are user-controlled. Before printing them, strip
//! ANSI escape sequences and control characters so a crafted name cannot clear the
//! screen, move the cursor or recolor the terminal.

/// Remove ANSI CSI/OSC sequences and control characters, keeping `\n` and `\t`.
///
/// ```
/// use qrforge::utils::terminal::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("\x1b[31mWiFi\x1b[0m"), "WiFi");
/// ```
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.peek() {
                // CSI: ESC [ params final-letter
                Some('[') => {
                    chars.next();
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() || next == '~' {
                            break;
                        }
                    }
                }
                // OSC: ESC ] ... terminated by BEL or ESC \
                Some(']') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if ch.is_control() && ch != '\n' && ch != '\t' {
            continue;
        }
        result.push(ch);
    }

    result
}

/// [`sanitize_for_terminal`] folded onto one line, for list rows and status messages
pub fn sanitize_single_line(text: &str) -> String {
    sanitize_for_terminal(text)
        .chars()
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
        .collect()
}
