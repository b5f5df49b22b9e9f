// Sanitization utilities

/// Element names that are dropped together with their entire subtree.
const FORBIDDEN_TAGS: &[&str] = &["script", "style", "iframe", "object", "embed", "link"];

fn is_forbidden(tag: &str) -> bool {
    FORBIDDEN_TAGS.contains(&tag)
}

/// Filter an HTML fragment down to a safe subset suitable for embedding in
/// a trusted document.
///
/// Forbidden elements are removed together with all of their content; a
/// stack of open forbidden tags tracks nesting so only the matching close
/// tag resumes output. Event-handler attributes (`on*`), `style`
/// attributes, and `javascript:` URLs in `href`/`src` are stripped from
/// the elements that remain. Text is re-escaped on output; well-formed
/// character references pass through verbatim. Comments, declarations, and
/// processing instructions are dropped. Malformed markup is handled
/// best-effort and never fails.
pub fn sanitize_html(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut skip_stack: Vec<String> = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'<' => pos = handle_markup(input, pos, &mut out, &mut skip_stack),
            b'&' => {
                if let Some(end) = scan_reference(bytes, pos) {
                    if skip_stack.is_empty() {
                        out.push_str(&input[pos..end]);
                    }
                    pos = end;
                } else {
                    if skip_stack.is_empty() {
                        out.push_str("&amp;");
                    }
                    pos += 1;
                }
            }
            b'>' => {
                if skip_stack.is_empty() {
                    out.push_str("&gt;");
                }
                pos += 1;
            }
            _ => {
                let mut end = pos + 1;
                while end < bytes.len() && !matches!(bytes[end], b'<' | b'&' | b'>') {
                    end += 1;
                }
                if skip_stack.is_empty() {
                    out.push_str(&input[pos..end]);
                }
                pos = end;
            }
        }
    }

    out.trim().to_string()
}

/// Escape text content for embedding in HTML.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a value for embedding in a double-quoted HTML attribute.
pub fn escape_attr(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

struct RawTag {
    name: String,
    attrs: Vec<(String, Option<String>)>,
    self_closing: bool,
}

/// Dispatch on the construct starting at the `<` at `pos`; returns the
/// position to resume scanning from.
fn handle_markup(input: &str, pos: usize, out: &mut String, skip_stack: &mut Vec<String>) -> usize {
    let bytes = input.as_bytes();
    match bytes.get(pos + 1).copied() {
        Some(b'!') => {
            if input[pos..].starts_with("<!--") {
                match find_from(bytes, pos + 4, b"-->") {
                    Some(i) => i + 3,
                    None => bytes.len(),
                }
            } else {
                skip_past(bytes, pos + 2, b'>')
            }
        }
        Some(b'?') => skip_past(bytes, pos + 2, b'>'),
        Some(b'/') => {
            let (name, end) = scan_close_tag(input, pos + 2);
            if let Some(name) = name {
                close_tag(&name, out, skip_stack);
            }
            end
        }
        Some(c) if c.is_ascii_alphabetic() => match scan_open_tag(input, pos + 1) {
            Some((tag, end)) => {
                open_tag(tag, out, skip_stack);
                end
            }
            // Unterminated tag at end of input is dropped.
            None => bytes.len(),
        },
        _ => {
            // A `<` that does not begin markup is plain text.
            if skip_stack.is_empty() {
                out.push_str("&lt;");
            }
            pos + 1
        }
    }
}

fn open_tag(tag: RawTag, out: &mut String, skip_stack: &mut Vec<String>) {
    let forbidden = is_forbidden(&tag.name);

    if !skip_stack.is_empty() {
        // Nested forbidden opens join the same suppression stack so a
        // mismatched close for an inner tag cannot resume output early.
        if forbidden && !tag.self_closing {
            skip_stack.push(tag.name);
        }
        return;
    }

    if forbidden {
        if !tag.self_closing {
            skip_stack.push(tag.name);
        }
        return;
    }

    out.push('<');
    out.push_str(&tag.name);
    for (name, value) in &tag.attrs {
        let Some(value) = value else { continue };
        if name.starts_with("on") || name == "style" {
            continue;
        }
        if (name == "href" || name == "src")
            && value.to_lowercase().starts_with("javascript:")
        {
            continue;
        }
        out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
    }
    if tag.self_closing {
        out.push('/');
    }
    out.push('>');
}

fn close_tag(name: &str, out: &mut String, skip_stack: &mut Vec<String>) {
    if let Some(top) = skip_stack.last() {
        if top == name {
            skip_stack.pop();
        }
        return;
    }
    // Unmatched closes of forbidden tags are ignored.
    if is_forbidden(name) {
        return;
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Scan an open tag starting at the first character of its name. Returns
/// `None` when the input ends before the tag does.
fn scan_open_tag(input: &str, start: usize) -> Option<(RawTag, usize)> {
    let bytes = input.as_bytes();
    let mut i = start;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    let name = input[start..i].to_ascii_lowercase();
    let mut attrs: Vec<(String, Option<String>)> = Vec::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i).copied() {
            None => return None,
            Some(b'>') => {
                return Some((
                    RawTag {
                        name,
                        attrs,
                        self_closing: false,
                    },
                    i + 1,
                ))
            }
            Some(b'/') => {
                if bytes.get(i + 1) == Some(&b'>') {
                    return Some((
                        RawTag {
                            name,
                            attrs,
                            self_closing: true,
                        },
                        i + 2,
                    ));
                }
                i += 1;
            }
            Some(_) => {
                let attr_start = i;
                while i < bytes.len()
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                    && !bytes[i].is_ascii_whitespace()
                {
                    i += 1;
                }
                if i == attr_start {
                    // Stray byte that cannot start an attribute name.
                    i += 1;
                    continue;
                }
                let attr_name = input[attr_start..i].to_ascii_lowercase();
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    let value = match bytes.get(i).copied() {
                        Some(quote) if quote == b'"' || quote == b'\'' => {
                            i += 1;
                            let value_start = i;
                            while i < bytes.len() && bytes[i] != quote {
                                i += 1;
                            }
                            let raw = &input[value_start..i];
                            if i < bytes.len() {
                                i += 1;
                            }
                            raw
                        }
                        _ => {
                            let value_start = i;
                            while i < bytes.len()
                                && bytes[i] != b'>'
                                && !bytes[i].is_ascii_whitespace()
                            {
                                i += 1;
                            }
                            &input[value_start..i]
                        }
                    };
                    attrs.push((attr_name, Some(decode_entities(value))));
                } else {
                    attrs.push((attr_name, None));
                }
            }
        }
    }
}

/// Scan a close tag starting just past `</`. Returns the lower-cased name
/// (if one was present) and the position after the closing `>`.
fn scan_close_tag(input: &str, start: usize) -> (Option<String>, usize) {
    let bytes = input.as_bytes();
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let name_start = i;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    let name = if i > name_start && bytes[name_start].is_ascii_alphabetic() {
        Some(input[name_start..i].to_ascii_lowercase())
    } else {
        None
    };
    (name, skip_past(bytes, i, b'>'))
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_' | b'.')
}

/// Recognize a character reference at `pos` (which holds `&`); returns the
/// position just past the `;` when one is present.
fn scan_reference(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos + 1;
    if bytes.get(i) == Some(&b'#') {
        i += 1;
        let hex = matches!(bytes.get(i).copied(), Some(b'x' | b'X'));
        if hex {
            i += 1;
        }
        let digits = i;
        while i < bytes.len()
            && (hex && bytes[i].is_ascii_hexdigit() || !hex && bytes[i].is_ascii_digit())
        {
            i += 1;
        }
        (i > digits && bytes.get(i) == Some(&b';')).then(|| i + 1)
    } else {
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
            i += 1;
        }
        (i > start && bytes[start].is_ascii_alphabetic() && bytes.get(i) == Some(&b';'))
            .then(|| i + 1)
    }
}

/// Decode character references in an attribute value so filters see the
/// effective bytes (a `javascript:` URL split across numeric references
/// must still be caught). Unknown named references are kept verbatim.
fn decode_entities(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'&' {
            if let Some(end) = scan_reference(bytes, pos) {
                match decode_reference(&value[pos + 1..end - 1]) {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&value[pos..end]),
                }
                pos = end;
                continue;
            }
        }
        let step = value[pos..].chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&value[pos..pos + step]);
        pos += step;
    }
    out
}

fn decode_reference(body: &str) -> Option<char> {
    match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = body.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn skip_past(bytes: &[u8], from: usize, target: u8) -> usize {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == target {
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}
