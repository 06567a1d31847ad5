use crate::fonts::{FontStyle, text_width_mm};

/// One wrapped line and whether it closes its paragraph. The last line of a
/// paragraph is never justified.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub ends_paragraph: bool,
}

/// Greedy word wrap to `max_width` millimetres. Explicit newlines start a new
/// paragraph; blank input lines are kept as empty lines. Words wider than the
/// whole line are split between characters.
pub fn wrap_text(text: &str, style: FontStyle, size: f32, max_width: f32) -> Vec<TextLine> {
    let space_w = text_width_mm(" ", style, size);
    let mut lines = Vec::new();

    for paragraph in text.trim_end().lines() {
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in paragraph.split_whitespace() {
            let word_w = text_width_mm(word, style, size);
            let needed = if current.is_empty() {
                word_w
            } else {
                current_w + space_w + word_w
            };

            if needed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_w = needed;
                continue;
            }

            if !current.is_empty() {
                lines.push(TextLine {
                    text: std::mem::take(&mut current),
                    ends_paragraph: false,
                });
                current_w = 0.0;
            }

            if word_w <= max_width {
                current.push_str(word);
                current_w = word_w;
            } else {
                for piece in split_long_word(word, style, size, max_width) {
                    if !current.is_empty() {
                        lines.push(TextLine {
                            text: std::mem::take(&mut current),
                            ends_paragraph: false,
                        });
                    }
                    current_w = text_width_mm(&piece, style, size);
                    current = piece;
                }
            }
        }

        lines.push(TextLine {
            text: current,
            ends_paragraph: true,
        });
    }

    lines
}

fn split_long_word(word: &str, style: FontStyle, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if piece.chars().count() > 1 && text_width_mm(&piece, style, size) > max_width {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Extra space per gap that stretches `line` to exactly `width`.
pub fn justify_spacing(line: &TextLine, style: FontStyle, size: f32, width: f32) -> f32 {
    if line.ends_paragraph {
        return 0.0;
    }
    let gaps = line.text.chars().filter(|&c| c == ' ').count();
    if gaps == 0 {
        return 0.0;
    }
    let slack = width - text_width_mm(&line.text, style, size);
    if slack <= 0.0 {
        return 0.0;
    }
    slack / gaps as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_within_width() {
        let text = "Ventrículo esquerdo com dimensões preservadas e espessura parietal normal.";
        let lines = wrap_text(text, FontStyle::Regular, 9.0, 40.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(&line.text, FontStyle::Regular, 9.0) <= 40.0 + 1e-3);
        }
        assert!(lines.last().unwrap().ends_paragraph);
        assert!(!lines[0].ends_paragraph);
    }

    #[test]
    fn keeps_explicit_newlines() {
        let lines = wrap_text("primeira\n\nterceira", FontStyle::Regular, 9.0, 100.0);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["primeira", "", "terceira"]);
    }

    #[test]
    fn splits_words_longer_than_a_line() {
        let word = "a".repeat(200);
        let lines = wrap_text(&word, FontStyle::Regular, 9.0, 30.0);
        assert!(lines.len() > 1);
        let rejoined: String = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(rejoined, word);
    }

    #[test]
    fn last_line_is_not_justified() {
        let lines = wrap_text("um dois três quatro cinco seis sete", FontStyle::Regular, 9.0, 25.0);
        let last = lines.last().unwrap();
        assert_eq!(justify_spacing(last, FontStyle::Regular, 9.0, 25.0), 0.0);
        assert!(justify_spacing(&lines[0], FontStyle::Regular, 9.0, 25.0) > 0.0);
    }
}
