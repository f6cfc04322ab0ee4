//! Form fill pipeline
//!
//! Applies a [`FieldMapping`] to the ODOT template, selects the weekday
//! radio group, and embeds site photos on the photographs page.

use pdf_form::{FormDocument, ImageScaleMode, PdfError};
use tracing::{debug, warn};

use crate::mapping::{FieldMapping, FieldValue};
use crate::Result;

/// Photo slot rectangles on the photographs page, `(x, y, width, height)`
/// in PDF user space. Two columns of three, top to bottom.
pub const PHOTO_SLOTS: [(f64, f64, f64, f64); 6] = [
    (21.6, 573.2, 189.0, 142.0),
    (324.0, 573.4, 189.0, 142.0),
    (21.6, 348.4, 189.0, 142.0),
    (324.0, 347.8, 189.0, 142.0),
    (21.6, 126.4, 189.0, 142.0),
    (324.0, 126.4, 189.0, 142.0),
];

/// Page number of the photographs page (1-indexed)
const PHOTO_PAGE: usize = 4;

/// Marker shared by every weekday radio widget's field name
const WEEKDAY_MARKER: &str = "Day";

/// Fill the template with a report's values and photos
///
/// Convenience wrapper over [`fill_form_document`] that takes the
/// template as bytes and returns the filled PDF as bytes.
pub fn fill_form(
    template: &[u8],
    mapping: &FieldMapping,
    photos: &[Vec<u8>],
) -> Result<Vec<u8>> {
    let mut doc = FormDocument::open_from_bytes(template)?;
    fill_form_document(&mut doc, mapping, photos)?;
    Ok(doc.to_bytes()?)
}

/// Fill an already-opened template document in place
pub fn fill_form_document(
    doc: &mut FormDocument,
    mapping: &FieldMapping,
    photos: &[Vec<u8>],
) -> Result<()> {
    let mut unmatched = 0usize;

    for (name, value) in &mapping.fields {
        let matched = match value {
            FieldValue::Text(text) => doc.set_text(name, text)?,
            FieldValue::Check(on) => doc.set_check(name, *on)?,
        };
        if !matched {
            debug!(field = %name, "no widget for field");
            unmatched += 1;
        }
    }
    if unmatched > 0 {
        warn!(unmatched, total = mapping.fields.len(), "some fields had no widget");
    }

    let touched =
        doc.select_button_group(WEEKDAY_MARKER, &mapping.weekday, &mapping.weekday_appearance)?;
    debug!(weekday = %mapping.weekday, widgets = touched, "weekday radios updated");

    // Let viewers regenerate appearances from the new /V values
    doc.set_need_appearances()?;

    embed_photos(doc, photos)?;

    Ok(())
}

/// Place photos into the fixed slots on the photographs page
///
/// Photos beyond the six slots are dropped. A photo that fails to decode
/// is skipped with a warning so one bad upload never sinks the report;
/// a template without a photographs page is a hard error.
fn embed_photos(doc: &mut FormDocument, photos: &[Vec<u8>]) -> Result<()> {
    if photos.len() > PHOTO_SLOTS.len() {
        warn!(
            photos = photos.len(),
            slots = PHOTO_SLOTS.len(),
            "more photos than slots, extras dropped"
        );
    }

    for (index, (photo, &(x, y, width, height))) in
        photos.iter().zip(PHOTO_SLOTS.iter()).enumerate()
    {
        match doc.insert_image_scaled(photo, PHOTO_PAGE, x, y, width, height, ImageScaleMode::FitBox)
        {
            Ok(()) => {}
            Err(err @ PdfError::InvalidPage(..)) => return Err(err.into()),
            Err(err) => {
                warn!(photo = index + 1, error = %err, "skipping photo");
            }
        }
    }

    Ok(())
}
