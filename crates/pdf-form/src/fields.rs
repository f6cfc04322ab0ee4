//! Widget annotation discovery and field value updates

use crate::document::FormDocument;
use crate::Result;
use lopdf::{Object, ObjectId, StringFormat};

/// Form field type, from the annotation's /FT entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text field (/Tx)
    Text,
    /// Pushbutton, checkbox or radio button (/Btn)
    Button,
    /// Signature field (/Sig)
    Signature,
    /// Choice field (/Ch) - present in some templates, never filled here
    Choice,
}

impl FieldKind {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"Tx" => Some(FieldKind::Text),
            b"Btn" => Some(FieldKind::Button),
            b"Sig" => Some(FieldKind::Signature),
            b"Ch" => Some(FieldKind::Choice),
            _ => None,
        }
    }
}

/// A widget annotation that carries a field name and type
#[derive(Debug, Clone)]
pub struct Widget {
    /// Object id of the annotation dictionary
    pub id: ObjectId,
    /// Fully-qualified field name from /T
    pub name: String,
    /// Field type from /FT
    pub kind: FieldKind,
}

impl FormDocument {
    /// Collect all widget annotations that carry both /T and /FT
    ///
    /// Annotations referenced from a page's /Annots array (directly or
    /// through a reference to the array) are resolved; inline annotation
    /// dictionaries carry no object id and are skipped.
    pub fn widgets(&self) -> Result<Vec<Widget>> {
        let mut widgets = Vec::new();

        for page_id in self.inner().get_pages().values() {
            let page_dict = match self.inner().get_object(*page_id)?.as_dict() {
                Ok(dict) => dict,
                Err(_) => continue,
            };

            let annots = match page_dict.get(b"Annots") {
                Ok(obj) => obj,
                Err(_) => continue,
            };

            // /Annots is either the array itself or a reference to it
            let annot_refs: Vec<ObjectId> = match annots {
                Object::Array(arr) => collect_refs(arr),
                Object::Reference(ref_id) => match self.inner().get_object(*ref_id) {
                    Ok(Object::Array(arr)) => collect_refs(arr),
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            };

            for annot_id in annot_refs {
                let dict = match self
                    .inner()
                    .get_object(annot_id)
                    .and_then(|o| o.as_dict())
                {
                    Ok(dict) => dict,
                    Err(_) => continue,
                };

                let name = match dict.get(b"T").and_then(|o| o.as_str()) {
                    Ok(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                    Err(_) => continue,
                };
                let kind = match dict
                    .get(b"FT")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .and_then(FieldKind::from_name)
                {
                    Some(kind) => kind,
                    None => continue,
                };

                widgets.push(Widget {
                    id: annot_id,
                    name,
                    kind,
                });
            }
        }

        Ok(widgets)
    }

    /// Set the value of a text or signature field
    ///
    /// Returns `true` when at least one matching widget was updated.
    pub fn set_text(&mut self, field_name: &str, value: &str) -> Result<bool> {
        let targets: Vec<ObjectId> = self
            .widgets()?
            .into_iter()
            .filter(|w| {
                w.name == field_name
                    && matches!(w.kind, FieldKind::Text | FieldKind::Signature)
            })
            .map(|w| w.id)
            .collect();

        for id in &targets {
            let dict = self.inner_mut().get_object_mut(*id)?.as_dict_mut()?;
            dict.set(
                "V",
                Object::String(value.as_bytes().to_vec(), StringFormat::Literal),
            );
        }

        Ok(!targets.is_empty())
    }

    /// Set a checkbox on (/Yes) or off (/Off)
    ///
    /// Updates both /V and /AS so the appearance matches the value.
    /// Returns `true` when at least one matching widget was updated.
    pub fn set_check(&mut self, field_name: &str, on: bool) -> Result<bool> {
        let targets: Vec<ObjectId> = self
            .widgets()?
            .into_iter()
            .filter(|w| w.name == field_name && w.kind == FieldKind::Button)
            .map(|w| w.id)
            .collect();

        let state: &[u8] = if on { b"Yes" } else { b"Off" };
        for id in &targets {
            let dict = self.inner_mut().get_object_mut(*id)?.as_dict_mut()?;
            dict.set("V", Object::Name(state.to_vec()));
            dict.set("AS", Object::Name(state.to_vec()));
        }

        Ok(!targets.is_empty())
    }

    /// Select one option within a group of button widgets
    ///
    /// Every /Btn widget whose field name contains `marker` belongs to the
    /// group. The widget whose name also contains `option` gets
    /// `/V /<option>` and `/AS /<appearance>`; all others in the group are
    /// turned off. Returns the number of widgets touched.
    pub fn select_button_group(
        &mut self,
        marker: &str,
        option: &str,
        appearance: &str,
    ) -> Result<usize> {
        let group: Vec<(ObjectId, bool)> = self
            .widgets()?
            .into_iter()
            .filter(|w| w.kind == FieldKind::Button && w.name.contains(marker))
            .map(|w| {
                let selected = w.name.contains(option);
                (w.id, selected)
            })
            .collect();

        for (id, selected) in &group {
            let dict = self.inner_mut().get_object_mut(*id)?.as_dict_mut()?;
            if *selected {
                dict.set("V", Object::Name(option.as_bytes().to_vec()));
                dict.set("AS", Object::Name(appearance.as_bytes().to_vec()));
            } else {
                dict.set("V", Object::Name(b"Off".to_vec()));
                dict.set("AS", Object::Name(b"Off".to_vec()));
            }
        }

        Ok(group.len())
    }
}

fn collect_refs(arr: &[Object]) -> Vec<ObjectId> {
    arr.iter()
        .filter_map(|obj| obj.as_reference().ok())
        .collect()
}
