pub mod color;
pub mod palette;
pub mod fade;
pub mod glyph;
pub mod diff;
pub mod protocol;
pub mod decode;

pub use color::{Color, ColorData, ColorError};
pub use decode::{Decoder, Event};
pub use diff::{diff_frames, FrameDiff};
pub use fade::FadeSequencer;
pub use glyph::{render_big_text, BigLine, GlyphError};
pub use protocol::{Command, CursorMode, CustomChar, ProtocolError};

#[cfg(test)]
mod tests {
    use crate::decode::{Decoder, Event};
    use crate::diff::{apply_diff, diff_frames};
    use crate::glyph::render_big_text;
    use crate::protocol::{encode_text, Command};

    #[test]
    fn big_text_diff_survives_the_wire() {
        let before = render_big_text("12:34").unwrap().remove(0).to_vec();
        let after = render_big_text("12:35").unwrap().remove(0).to_vec();

        let diff = diff_frames(&before[..], &after[..]);
        assert!(!diff.is_empty());
        // Only the last digit changes
        assert!(diff.keys().all(|&(x, _)| x >= 14));

        let mut bytes = Vec::new();
        for (&(x, y), text) in &diff {
            Command::CursorPos { x: x as u8, y: y as u8 }.encode(&mut bytes);
            encode_text(text, &mut bytes);
        }

        // Replay the stream onto the old frame
        let mut decoder = Decoder::new(20, 4);
        decoder.push(&bytes);
        let mut screen = before.clone();
        let mut cursor = (0usize, 0usize);
        while let Some(event) = decoder.next_event() {
            match event.unwrap() {
                Event::Command(Command::CursorPos { x, y }) => cursor = (x as usize, y as usize),
                Event::Text(text) => {
                    let text: String = text.iter().map(|&b| b as char).collect();
                    let mut patch = crate::diff::FrameDiff::new();
                    patch.insert(cursor, text);
                    apply_diff(&mut screen, &patch);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(screen, after);
    }
}
