use proc_macro::TokenStream;
use quote::quote;
use syn::{LitStr, parse_macro_input};

/// Resolves a note name to its MIDI note number at compile time.
///
/// The macro expands to a `u8` literal, so it can be used anywhere a MIDI note
/// is expected, including `const` items and match patterns in tests.
///
/// # Format
///
/// `<pitch>[octave]` where:
/// - `pitch` is one of C, D, E, F, G, A, B with an optional `#` or `b`
/// - `octave` is optional and defaults to 4; when given it must be -1 to 9
/// - the resulting note must lie in 0-127 (G9 is the highest)
///
/// # Examples
///
/// ```ignore
/// use spinsynth::note;
///
/// const A4: u8 = note!("A4"); // 69
/// let middle_c = note!("C");  // 60
/// let bflat = note!("Bb3");   // 58
/// ```
#[proc_macro]
pub fn note(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as LitStr);
    let note_str = input.value();

    match parse_note(&note_str).and_then(|(pitch, octave)| to_midi(pitch, octave)) {
        Ok(midi_note) => TokenStream::from(quote! { #midi_note }),
        Err(e) => {
            let error_msg = format!("invalid note '{}': {}", note_str, e);
            TokenStream::from(quote! { compile_error!(#error_msg) })
        }
    }
}

/// Semitone offset from C.
fn parse_pitch(s: &str) -> Result<i16, String> {
    match s.to_uppercase().as_str() {
        "B#" => Ok(12),
        "C" => Ok(0),
        "C#" | "DB" => Ok(1),
        "D" => Ok(2),
        "D#" | "EB" => Ok(3),
        "E" | "FB" => Ok(4),
        "F" | "E#" => Ok(5),
        "F#" | "GB" => Ok(6),
        "G" => Ok(7),
        "G#" | "AB" => Ok(8),
        "A" => Ok(9),
        "A#" | "BB" => Ok(10),
        "B" => Ok(11),
        "CB" => Ok(-1),
        other => Err(format!("unknown pitch name '{}'", other)),
    }
}

fn parse_note(s: &str) -> Result<(i16, i16), String> {
    if s.is_empty() {
        return Err("empty string".to_string());
    }

    let (pitch_str, octave) = match s.find(|c: char| c.is_ascii_digit() || c == '-') {
        Some(0) => return Err("missing pitch name".to_string()),
        Some(pos) => {
            let octave_str = &s[pos..];
            let octave = octave_str
                .parse::<i16>()
                .map_err(|_| format!("invalid octave '{}'", octave_str))?;
            if !(-1..=9).contains(&octave) {
                return Err(format!("octave {} out of range (-1 to 9)", octave));
            }
            (&s[..pos], octave)
        }
        None => (s, 4),
    };

    Ok((parse_pitch(pitch_str)?, octave))
}

fn to_midi(semitone: i16, octave: i16) -> Result<u8, String> {
    let midi = (octave + 1) * 12 + semitone;
    u8::try_from(midi)
        .ok()
        .filter(|n| *n <= 127)
        .ok_or_else(|| format!("note {} is outside the MIDI range", midi))
}
