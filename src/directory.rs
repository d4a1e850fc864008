// src/directory.rs
use log::{debug, info, warn};
use serde::Deserialize;

/// A colleague who can be named as the contact while the user is away.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Delegate {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
}

impl Delegate {
    /// Text shown for this delegate in the selection control.
    pub fn option_label(&self) -> String {
        format!("{} ({})", self.name, self.department)
    }
}

/// One entry of the delegate selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// `None` for the leading "select…" placeholder.
    pub value: Option<u32>,
    pub label: String,
}

/// Read-only list of delegates, loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    delegates: Vec<Delegate>,
}

impl Directory {
    /// Loads from the configured override, or from the built-in list.
    // TODO: fetch from the CRM directory once it exposes an API; an
    // unreachable source should surface a status message instead of an empty list.
    pub fn load(source: Option<Vec<Delegate>>) -> Self {
        let delegates = match source {
            Some(list) => {
                info!("Loading {} colleagues from configuration", list.len());
                list
            }
            None => {
                info!("Loading built-in colleague list");
                builtin_delegates()
            }
        };
        if delegates.is_empty() {
            warn!("Colleague directory is empty; selection will only show the placeholder");
        }
        debug!("Colleagues loaded: {}", delegates.len());
        Self { delegates }
    }

    pub fn delegates(&self) -> &[Delegate] {
        &self.delegates
    }

    pub fn find(&self, id: u32) -> Option<&Delegate> {
        self.delegates.iter().find(|d| d.id == id)
    }

    /// Placeholder first, then one option per delegate in source order.
    pub fn options(&self, placeholder: &str) -> Vec<SelectOption> {
        std::iter::once(SelectOption {
            value: None,
            label: placeholder.to_string(),
        })
        .chain(self.delegates.iter().map(|d| SelectOption {
            value: Some(d.id),
            label: d.option_label(),
        }))
        .collect()
    }
}

fn delegate(id: u32, name: &str, email: &str, phone: &str, department: &str) -> Delegate {
    Delegate {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        department: department.to_string(),
    }
}

// Mocked CRM data
fn builtin_delegates() -> Vec<Delegate> {
    vec![
        delegate(1, "Ahmet Yılmaz", "ahmet.yilmaz@ozturyakiler.com.tr", "+90 212 555 0101", "İnsan Kaynakları"),
        delegate(2, "Fatma Demir", "fatma.demir@ozturyakiler.com.tr", "+90 212 555 0102", "Muhasebe"),
        delegate(3, "Mehmet Kaya", "mehmet.kaya@ozturyakiler.com.tr", "+90 212 555 0103", "Satış"),
        delegate(4, "Ayşe Özkan", "ayse.ozkan@ozturyakiler.com.tr", "+90 212 555 0104", "Pazarlama"),
        delegate(5, "Can Şahin", "can.sahin@ozturyakiler.com.tr", "+90 212 555 0105", "IT"),
        delegate(6, "Zeynep Arslan", "zeynep.arslan@ozturyakiler.com.tr", "+90 212 555 0106", "Hukuk"),
        delegate(7, "Murat Çelik", "murat.celik@ozturyakiler.com.tr", "+90 212 555 0107", "Finans"),
        delegate(8, "Elif Koç", "elif.koc@ozturyakiler.com.tr", "+90 212 555 0108", "Operasyon"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_start_with_placeholder_and_keep_source_order() {
        let directory = Directory::load(None);
        let options = directory.options("Seçiniz...");
        assert_eq!(options.len(), directory.delegates().len() + 1);
        assert_eq!(options[0].value, None);
        assert_eq!(options[0].label, "Seçiniz...");
        assert_eq!(options[1].value, Some(1));
        assert_eq!(options[1].label, "Ahmet Yılmaz (İnsan Kaynakları)");
        assert_eq!(options[8].value, Some(8));
    }

    #[test]
    fn empty_source_renders_only_placeholder() {
        let directory = Directory::load(Some(Vec::new()));
        let options = directory.options("Select...");
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, None);
    }

    #[test]
    fn override_replaces_builtin_list() {
        let custom = vec![delegate(9, "X", "x@example.com", "1", "Y")];
        let directory = Directory::load(Some(custom.clone()));
        assert_eq!(directory.delegates(), custom.as_slice());
        assert!(directory.find(1).is_none());
        assert_eq!(directory.find(9).map(|d| d.name.as_str()), Some("X"));
    }
}
