/* src/server/pages/rust/src/escape.rs */

/// Make serialized JSON safe to inline in an HTML `<script>` element.
///
/// Inside JSON strings, `<`, `>`, `&`, U+2028 and U+2029 are replaced with
/// `\uXXXX` escapes. The result is still valid JSON and decodes to the same
/// value, but can no longer close the surrounding script tag.
pub fn escape_inline_json(json: &str) -> String {
  let mut out = String::with_capacity(json.len());
  let mut in_string = false;
  let mut chars = json.chars();

  while let Some(ch) = chars.next() {
    if !in_string {
      if ch == '"' {
        in_string = true;
      }
      out.push(ch);
      continue;
    }
    match ch {
      '\\' => {
        // Keep existing escapes intact
        out.push(ch);
        if let Some(next) = chars.next() {
          out.push(next);
        }
      }
      '"' => {
        in_string = false;
        out.push(ch);
      }
      '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => {
        out.push_str(&format!("\\u{:04x}", ch as u32));
      }
      _ => out.push(ch),
    }
  }
  out
}
