//! vCard 3.0 serializer.
//!
//! Produces CRLF line endings and folds at 75 octets per RFC 2425 §5.8.1.

use bizzy_core::sharing::PublicCard;

// ─── Line folding ────────────────────────────────────────────────────────────

/// Emit `s` as one logical line, folding at 75 octets with CRLF + SP
/// continuation.
fn fold_line(s: &str) -> String {
  if s.len() <= 75 {
    return format!("{}\r\n", s);
  }

  let mut result = String::new();
  let total = s.len();
  let mut pos = 0usize;
  let mut first = true;

  while pos < total {
    let limit = if first { 75 } else { 74 };
    let end = if pos + limit >= total {
      total
    } else {
      // Walk back to the nearest valid UTF-8 char boundary
      let mut e = pos + limit;
      while e > pos && !s.is_char_boundary(e) {
        e -= 1;
      }
      // Guarantee at least one byte per segment
      if e == pos { pos + 1 } else { e }
    };

    if !first {
      result.push(' ');
    }
    result.push_str(&s[pos..end]);
    result.push_str("\r\n");
    pos = end;
    first = false;
  }

  result
}

// ─── Value escaping ──────────────────────────────────────────────────────────

/// Escape a property value: `\`, `,`, `;`, newline. Carriage returns
/// are dropped.
fn escape_value(s: &str) -> String {
  s.replace('\\', "\\\\")
   .replace(',', "\\,")
   .replace(';', "\\;")
   .replace('\n', "\\n")
   .replace('\r', "")
}

/// Strip display separators from a phone number for the `TEL` line; a
/// leading `+` is kept.
fn format_phone(phone_number: &str) -> String {
  phone_number
    .chars()
    .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
    .collect()
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Serialize `card` as a vCard 3.0 string.
pub fn serialize(card: &PublicCard) -> String {
  let mut lines: Vec<String> = Vec::new();

  lines.push(fold_line("BEGIN:VCARD"));
  lines.push(fold_line("VERSION:3.0"));

  lines.push(fold_line(&format!("FN:{}", escape_value(&card.name))));
  // Display name in the family slot; remaining N components empty.
  lines.push(fold_line(&format!("N:{};;;;", escape_value(&card.name))));

  lines.push(fold_line(&format!("EMAIL:{}", escape_value(&card.email))));

  if let Some(phone) = &card.phone_number {
    lines.push(fold_line(&format!(
      "TEL:{}",
      escape_value(&format_phone(phone))
    )));
  }

  if let Some(title) = &card.title {
    lines.push(fold_line(&format!("TITLE:{}", escape_value(title))));
  }

  if let Some(company) = &card.company {
    lines.push(fold_line(&format!("ORG:{}", escape_value(company))));
    // ROLE only qualifies an organisation.
    if let Some(role) = &card.role {
      lines.push(fold_line(&format!("ROLE:{}", escape_value(role))));
    }
  }

  if let Some(bio) = &card.bio {
    lines.push(fold_line(&format!("NOTE:{}", escape_value(bio))));
  }

  if !card.tags.is_empty() {
    let tags: Vec<String> = card.tags.iter().map(|t| escape_value(t)).collect();
    lines.push(fold_line(&format!("CATEGORIES:{}", tags.join(","))));
  }

  if let Some(photo_url) = &card.profile_photo_url {
    lines.push(fold_line(&format!(
      "PHOTO;TYPE=URL;VALUE=uri:{}",
      escape_value(photo_url)
    )));
  }

  for link in &card.social_links {
    lines.push(fold_line(&format!(
      "URL;TYPE={}:{}",
      link.platform.as_str().to_uppercase(),
      escape_value(&link.url)
    )));
  }

  lines.push(fold_line("END:VCARD"));
  lines.concat()
}

/// Download filename for a card's `.vcf`: every non-alphanumeric
/// character in the display name becomes `_`.
pub fn vcf_filename(name: &str) -> String {
  let sanitized: String = name
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
    .collect();
  format!("{sanitized}.vcf")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use bizzy_core::{
    link::Platform,
    sharing::{PublicCard, PublicLink},
  };

  use super::*;

  fn card(name: &str, email: &str) -> PublicCard {
    PublicCard {
      name:              name.into(),
      title:             None,
      email:             email.into(),
      phone_number:      None,
      company:           None,
      role:              None,
      bio:               None,
      tags:              vec![],
      profile_photo_url: None,
      resume_file_url:   None,
      social_links:      vec![],
    }
  }

  // ── Envelope ────────────────────────────────────────────────────────────────

  #[test]
  fn envelope_contains_required_lines() {
    let out = serialize(&card("Alice", "alice@example.com"));
    assert!(out.starts_with("BEGIN:VCARD\r\nVERSION:3.0\r\n"));
    assert!(out.ends_with("END:VCARD\r\n"));
    assert!(out.contains("FN:Alice\r\n"));
    assert!(out.contains("N:Alice;;;;\r\n"));
    assert!(out.contains("EMAIL:alice@example.com\r\n"));
  }

  #[test]
  fn every_line_is_crlf_terminated() {
    let out = serialize(&card("Alice", "alice@example.com"));
    for line in out.split_inclusive("\r\n") {
      assert!(line.ends_with("\r\n"), "line not CRLF-terminated: {line:?}");
    }
    assert!(!out.contains("\n\n"));
  }

  // ── Phone formatting ────────────────────────────────────────────────────────

  #[test]
  fn phone_separators_are_stripped_plus_kept() {
    let mut c = card("Jane Q. Doe", "jane@x.com");
    c.phone_number = Some("+1 (555) 123-4567".into());
    let out = serialize(&c);
    assert!(out.contains("FN:Jane Q. Doe\r\n"), "got:\n{out}");
    assert!(out.contains("EMAIL:jane@x.com\r\n"));
    assert!(out.contains("TEL:+15551234567\r\n"), "got:\n{out}");
  }

  // ── Optional properties ─────────────────────────────────────────────────────

  #[test]
  fn role_requires_company() {
    let mut c = card("Alice", "a@b.com");
    c.role = Some("IC".into());
    let out = serialize(&c);
    assert!(!out.contains("ROLE:"), "ROLE without ORG in:\n{out}");

    c.company = Some("Acme".into());
    let out = serialize(&c);
    assert!(out.contains("ORG:Acme\r\n"));
    assert!(out.contains("ROLE:IC\r\n"));
  }

  #[test]
  fn tags_become_categories() {
    let mut c = card("Alice", "a@b.com");
    c.tags = vec!["design".into(), "rust, systems".into()];
    let out = serialize(&c);
    assert!(
      out.contains("CATEGORIES:design,rust\\, systems\r\n"),
      "got:\n{out}"
    );
  }

  #[test]
  fn social_links_emit_typed_urls() {
    let mut c = card("Alice", "a@b.com");
    c.social_links = vec![
      PublicLink {
        platform: Platform::GitHub,
        url:      "https://github.com/alice".into(),
      },
      PublicLink {
        platform: Platform::LinkedIn,
        url:      "https://linkedin.com/in/alice".into(),
      },
    ];
    let out = serialize(&c);
    assert!(out.contains("URL;TYPE=GITHUB:https://github.com/alice\r\n"));
    assert!(out.contains("URL;TYPE=LINKEDIN:https://linkedin.com/in/alice\r\n"));
  }

  #[test]
  fn photo_url_emitted_when_present() {
    let mut c = card("Alice", "a@b.com");
    c.profile_photo_url = Some("https://bizzy.example/files/abc".into());
    let out = serialize(&c);
    assert!(
      out.contains("PHOTO;TYPE=URL;VALUE=uri:https://bizzy.example/files/abc\r\n"),
      "got:\n{out}"
    );
  }

  // ── Escaping and folding ────────────────────────────────────────────────────

  #[test]
  fn special_characters_are_escaped() {
    let mut c = card("Smith; Alice", "a@b.com");
    c.bio = Some("line one\nline two, with commas".into());
    let out = serialize(&c);
    assert!(out.contains("FN:Smith\\; Alice\r\n"), "got:\n{out}");
    assert!(
      out.contains("NOTE:line one\\nline two\\, with commas\r\n"),
      "got:\n{out}"
    );
  }

  #[test]
  fn long_bio_is_folded() {
    let mut c = card("Alice", "a@b.com");
    c.bio = Some("B".repeat(200));
    let out = serialize(&c);
    for physical_line in out.split("\r\n").filter(|l| !l.is_empty()) {
      assert!(
        physical_line.len() <= 75,
        "physical line too long ({} bytes): {:?}",
        physical_line.len(),
        physical_line
      );
    }
  }

  // ── Filenames ───────────────────────────────────────────────────────────────

  #[test]
  fn filename_replaces_non_alphanumerics() {
    assert_eq!(vcf_filename("Jane Q. Doe"), "Jane_Q__Doe.vcf");
    assert_eq!(vcf_filename("Alice"), "Alice.vcf");
  }
}
