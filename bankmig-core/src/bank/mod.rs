//! Just enough of the bank XML to find the signature and rebuild the payload
//! it covers. Unknown tags are skipped; nothing here validates the document.

pub mod signature;

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

pub const ROOT_CLOSE: &str = "</Bank>";

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Za-z_][\w.-]*)((?:\s+[^\s=/>]+\s*=\s*"[^"]*")*)\s*(/?)>"#)
        .expect("tag pattern")
});
static ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([^\s=/>]+)\s*=\s*"([^"]*)""#).expect("attr pattern"));

/// Embedded signature: its value and where that value sits in the raw text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedSignature {
    pub value: String,
    pub span: Range<usize>,
}

type Values = Vec<(String, String)>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BankDocument {
    /// section -> key -> value attributes in document order
    pub sections: BTreeMap<String, BTreeMap<String, Values>>,
    pub signature: Option<EmbeddedSignature>,
    /// Offset of the closing root tag, if any.
    pub root_close: Option<usize>,
}

impl BankDocument {
    pub fn parse(text: &str) -> Self {
        let mut doc = BankDocument::default();
        let mut section: Option<String> = None;
        let mut key: Option<String> = None;

        for cap in TAG.captures_iter(text) {
            let closing = !cap[1].is_empty();
            let name = &cap[2];
            let Some(attrs_m) = cap.get(3) else { continue };
            let self_closing = !cap[4].is_empty();

            if closing {
                match name {
                    "Section" => {
                        section = None;
                        key = None;
                    }
                    "Key" => key = None,
                    "Bank" => doc.root_close = Some(cap.get(0).map_or(0, |m| m.start())),
                    _ => {}
                }
                continue;
            }

            let attr = |want: &str| {
                ATTR.captures_iter(attrs_m.as_str())
                    .find_map(|a| if &a[1] == want { a.get(2) } else { None })
            };

            match name {
                "Section" => {
                    let n = attr("name").map(|m| m.as_str().to_string()).unwrap_or_default();
                    doc.sections.entry(n.clone()).or_default();
                    section = (!self_closing).then_some(n);
                    key = None;
                }
                "Key" => {
                    let Some(s) = section.as_ref() else { continue };
                    let n = attr("name").map(|m| m.as_str().to_string()).unwrap_or_default();
                    if let Some(keys) = doc.sections.get_mut(s) {
                        keys.entry(n.clone()).or_default();
                    }
                    key = (!self_closing).then_some(n);
                }
                "Value" => {
                    let (Some(s), Some(k)) = (section.as_ref(), key.as_ref()) else {
                        continue;
                    };
                    let vals: Values = ATTR
                        .captures_iter(attrs_m.as_str())
                        .map(|a| (a[1].to_string(), a[2].to_string()))
                        .collect();
                    if let Some(slot) = doc.sections.get_mut(s).and_then(|m| m.get_mut(k)) {
                        slot.extend(vals);
                    }
                }
                "Signature" => {
                    if let Some(m) = attr("value") {
                        let base = attrs_m.start();
                        doc.signature = Some(EmbeddedSignature {
                            value: m.as_str().to_string(),
                            span: base + m.start()..base + m.end(),
                        });
                    }
                }
                _ => {}
            }
        }
        doc
    }

    /// Canonical signing payload: sections and keys sorted by name, value
    /// attributes in document order.
    pub fn payload(&self) -> String {
        let mut out = String::new();
        for (section, keys) in &self.sections {
            out.push_str(section);
            for (key, values) in keys {
                out.push_str(key);
                for (attr, value) in values {
                    out.push_str(attr);
                    out.push_str(value);
                }
            }
        }
        out
    }

    /// Does the embedded signature match one recomputed for these identifiers?
    pub fn verify(&self, owner_id: &str, user_id: &str, bank_name: &str) -> bool {
        match &self.signature {
            Some(sig) => {
                sig.value == signature::compute(owner_id, user_id, bank_name, &self.payload())
            }
            None => false,
        }
    }
}
