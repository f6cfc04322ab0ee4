//! End-to-end fill tests for the report crate
//!
//! These build a reduced ODOT-style template in memory, run the full
//! extract/map/fill pipeline on sample report JSON, and verify the
//! resulting PDF after a reload.

use lopdf::{dictionary, Object, StringFormat};
use report::{build_field_mapping, fill_form};
use serde_json::json;

struct FieldSpec {
    name: &'static str,
    ft: &'static [u8],
}

/// Fields a fill test needs to observe, a small slice of the real form
const TEMPLATE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "form1[0].Page1[0].WeatherSub[0].Weather[0].Row1[0].Cell4[0]",
        ft: b"Btn",
    },
    FieldSpec {
        name: "form1[0].Page1[0].WeatherSub[0].Weather[0].Row2[0].Cell2[0]",
        ft: b"Btn",
    },
    FieldSpec {
        name: "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].ContractorTable[0].Row0[0].Cell1[0]",
        ft: b"Tx",
    },
    FieldSpec {
        name: "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].ContractorTable[0].Row0[0].Cell2[0]",
        ft: b"Tx",
    },
    FieldSpec {
        name: "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].PhotoYes[0]",
        ft: b"Btn",
    },
    FieldSpec {
        name: "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].PhotoNo[0]",
        ft: b"Btn",
    },
    FieldSpec {
        name: "form1[0].Page1[0].ProjectSub[0].#area[0].Contractor[1]",
        ft: b"Tx",
    },
    FieldSpec {
        name: "form1[0].#subform[1].RemarksSub1[0].Remarks[0]",
        ft: b"Tx",
    },
    FieldSpec {
        name: "form1[0].Page1[0].EquipSub1[0].Equip[0]",
        ft: b"Tx",
    },
    FieldSpec {
        name: "form1[0].#pageSet[0].Master1[0].SignSub[0].#area[0].WorkDate[0]",
        ft: b"Tx",
    },
    FieldSpec {
        name: "form1[0].#pageSet[0].Master1[0].SignSub[0].#area[0].Signature[0]",
        ft: b"Sig",
    },
    FieldSpec {
        name: "form1[0].Page1[0].WeatherSub[0].DayMonday[0]",
        ft: b"Btn",
    },
    FieldSpec {
        name: "form1[0].Page1[0].WeatherSub[0].DayTuesday[0]",
        ft: b"Btn",
    },
    FieldSpec {
        name: "form1[0].Page1[0].WeatherSub[0].DaySunday[0]",
        ft: b"Btn",
    },
];

/// Create a template PDF with widgets on page 1
fn create_template(fields: &[FieldSpec], page_count: usize) -> Vec<u8> {
    let mut doc = lopdf::Document::new();

    let pages_id = doc.add_object(Object::Dictionary(dictionary! {
        "Type" => "Pages",
        "Count" => page_count as i32,
        "Kids" => vec![], // Updated below
    }));

    let mut annot_ids = Vec::new();
    for field in fields {
        let annot_id = doc.add_object(Object::Dictionary(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => Object::Name(field.ft.to_vec()),
            "T" => Object::String(field.name.as_bytes().to_vec(), StringFormat::Literal),
            "Rect" => vec![0.into(), 0.into(), 100.into(), 20.into()],
        }));
        annot_ids.push(annot_id);
    }

    let mut page_ids = Vec::new();
    for page_index in 0..page_count {
        let contents_id = doc.add_object(Object::Stream(lopdf::Stream::new(
            dictionary! {},
            vec![],
        )));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {},
            "Contents" => contents_id,
        };
        if page_index == 0 && !annot_ids.is_empty() {
            page_dict.set(
                "Annots",
                Object::Array(annot_ids.iter().map(|id| (*id).into()).collect()),
            );
        }
        page_ids.push(doc.add_object(Object::Dictionary(page_dict)));
    }

    let mut pages_dict = doc.get_object(pages_id).unwrap().as_dict().unwrap().clone();
    pages_dict.set(
        "Kids",
        Object::Array(page_ids.into_iter().map(|id| id.into()).collect()),
    );
    doc.objects.insert(pages_id, pages_dict.into());

    let acroform_id = doc.add_object(Object::Dictionary(dictionary! {
        "Fields" => Object::Array(annot_ids.iter().map(|id| (*id).into()).collect()),
    }));

    let catalog_id = doc.add_object(Object::Dictionary(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acroform_id,
    }));

    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Find a widget's dictionary entry value in a saved document
fn widget_entry(data: &[u8], field_name: &str, key: &[u8]) -> Option<Object> {
    let doc = lopdf::Document::load_mem(data).unwrap();
    for (_, obj) in doc.objects.iter() {
        if let Ok(dict) = obj.as_dict() {
            if let Ok(title) = dict.get(b"T").and_then(|o| o.as_str()) {
                if title == field_name.as_bytes() {
                    return dict.get(key).ok().cloned();
                }
            }
        }
    }
    None
}

fn create_test_jpeg() -> Vec<u8> {
    vec![
        0xFF, 0xD8, // SOI
        0xFF, 0xC0, // SOF0
        0x00, 0x11, // Length
        0x08, // Precision
        0x00, 0x10, // Height (16)
        0x00, 0x10, // Width (16)
        0x03, // Components
        0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xD9, // EOI
    ]
}

fn sample_report() -> serde_json::Value {
    json!({
        "DocumentDate": "2024-03-19",
        "Timezone": "America/Los_Angeles",
        "Weather": {
            "Temperature": 74,
            "Wind": "Calm",
            "Humidity": 40,
            "Conditions": "Light Rain"
        },
        "Personnel": [
            { "Contractor": "Acme Paving", "Trade": "Superintendent", "Name": "Sam Rivers", "Count": 1 },
            { "Contractor": "Acme Paving", "Trade": "Laborer", "Count": 3 }
        ],
        "Equipment": [
            { "Name": "Excavator" },
            { "Name": "Roller" }
        ],
        "Narrative": [
            { "Text": "Paving northbound lanes", "Timestamp": "07:30" }
        ]
    })
}

#[test]
fn test_fill_sample_report() {
    let template = create_template(TEMPLATE_FIELDS, 4);
    let mapping = build_field_mapping(&sample_report());

    let filled = fill_form(&template, &mapping, &[]).expect("fill failed");

    // Weather: rain checks row 1 cell 4, 74F checks row 2 cell 2
    let rain = widget_entry(
        &filled,
        "form1[0].Page1[0].WeatherSub[0].Weather[0].Row1[0].Cell4[0]",
        b"V",
    )
    .unwrap();
    assert_eq!(rain.as_name().unwrap(), b"Yes");
    let temp = widget_entry(
        &filled,
        "form1[0].Page1[0].WeatherSub[0].Weather[0].Row2[0].Cell2[0]",
        b"V",
    )
    .unwrap();
    assert_eq!(temp.as_name().unwrap(), b"Yes");

    // Contractor table
    let contractor = widget_entry(
        &filled,
        "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].ContractorTable[0].Row0[0].Cell1[0]",
        b"V",
    )
    .unwrap();
    assert_eq!(contractor.as_str().unwrap(), b"Acme Paving");
    let hours = widget_entry(
        &filled,
        "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].ContractorTable[0].Row0[0].Cell2[0]",
        b"V",
    )
    .unwrap();
    assert_eq!(hours.as_str().unwrap(), b"8");

    // Supervisor present
    let supervisor = widget_entry(
        &filled,
        "form1[0].Page1[0].ProjectSub[0].#area[0].Contractor[1]",
        b"V",
    )
    .unwrap();
    assert_eq!(supervisor.as_str().unwrap(), b"Sam Rivers");
    let yes = widget_entry(
        &filled,
        "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].PhotoYes[0]",
        b"V",
    )
    .unwrap();
    assert_eq!(yes.as_name().unwrap(), b"Yes");
    let no = widget_entry(
        &filled,
        "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].PhotoNo[0]",
        b"V",
    )
    .unwrap();
    assert_eq!(no.as_name().unwrap(), b"Off");

    // Remarks and equipment blocks
    let remarks = widget_entry(&filled, "form1[0].#subform[1].RemarksSub1[0].Remarks[0]", b"V")
        .unwrap();
    assert_eq!(remarks.as_str().unwrap(), b"[07:30] Paving northbound lanes");
    let equip = widget_entry(&filled, "form1[0].Page1[0].EquipSub1[0].Equip[0]", b"V").unwrap();
    assert_eq!(equip.as_str().unwrap(), b"Excavator\nRoller");

    // Footer on page master 0, including the signature field left blank
    let date = widget_entry(
        &filled,
        "form1[0].#pageSet[0].Master1[0].SignSub[0].#area[0].WorkDate[0]",
        b"V",
    )
    .unwrap();
    assert_eq!(date.as_str().unwrap(), b"03/19/24");
    let signature = widget_entry(
        &filled,
        "form1[0].#pageSet[0].Master1[0].SignSub[0].#area[0].Signature[0]",
        b"V",
    )
    .unwrap();
    assert_eq!(signature.as_str().unwrap(), b"");

    // Weekday radios: Tuesday selected with appearance /2, rest off
    let tuesday = widget_entry(
        &filled,
        "form1[0].Page1[0].WeatherSub[0].DayTuesday[0]",
        b"AS",
    )
    .unwrap();
    assert_eq!(tuesday.as_name().unwrap(), b"2");
    let monday = widget_entry(
        &filled,
        "form1[0].Page1[0].WeatherSub[0].DayMonday[0]",
        b"V",
    )
    .unwrap();
    assert_eq!(monday.as_name().unwrap(), b"Off");

    // NeedAppearances flagged so viewers regenerate appearances
    let doc = lopdf::Document::load_mem(&filled).unwrap();
    let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let catalog = doc.get_object(catalog_id).unwrap().as_dict().unwrap();
    let form_id = catalog.get(b"AcroForm").unwrap().as_reference().unwrap();
    let form = doc.get_object(form_id).unwrap().as_dict().unwrap();
    assert!(form.get(b"NeedAppearances").unwrap().as_bool().unwrap());
}

#[test]
fn test_fill_with_photos() {
    let template = create_template(TEMPLATE_FIELDS, 4);
    let mapping = build_field_mapping(&sample_report());
    let photos = vec![create_test_jpeg()];

    let filled = fill_form(&template, &mapping, &photos).expect("fill failed");

    // The photographs page carries the embedded XObject
    let doc = lopdf::Document::load_mem(&filled).unwrap();
    let pages = doc.get_pages();
    let page = doc.get_object(pages[&4]).unwrap().as_dict().unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    assert!(xobjects.get(b"Im1").is_ok());
}

#[test]
fn test_photos_capped_at_six_slots() {
    let template = create_template(TEMPLATE_FIELDS, 4);
    let mapping = build_field_mapping(&sample_report());

    // Seven distinct photos; the height byte keeps them from deduplicating
    let photos: Vec<Vec<u8>> = (1u8..=7)
        .map(|h| {
            let mut jpeg = create_test_jpeg();
            jpeg[8] = h;
            jpeg
        })
        .collect();

    let filled = fill_form(&template, &mapping, &photos).expect("fill failed");

    let doc = lopdf::Document::load_mem(&filled).unwrap();
    let pages = doc.get_pages();
    let page = doc.get_object(pages[&4]).unwrap().as_dict().unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();

    // One XObject per slot, the seventh photo is dropped
    assert_eq!(xobjects.len(), 6);
    assert!(xobjects.get(b"Im6").is_ok());
    assert!(xobjects.get(b"Im7").is_err());
}

#[test]
fn test_photos_require_photographs_page() {
    let template = create_template(TEMPLATE_FIELDS, 1);
    let mapping = build_field_mapping(&sample_report());
    let photos = vec![create_test_jpeg()];

    let result = fill_form(&template, &mapping, &photos);
    assert!(result.is_err());
}

#[test]
fn test_undecodable_photo_is_skipped() {
    let template = create_template(TEMPLATE_FIELDS, 4);
    let mapping = build_field_mapping(&sample_report());
    let photos = vec![b"not an image at all".to_vec(), create_test_jpeg()];

    // The bad photo is dropped; the good one still lands
    let filled = fill_form(&template, &mapping, &photos).expect("fill failed");

    let doc = lopdf::Document::load_mem(&filled).unwrap();
    let pages = doc.get_pages();
    let page = doc.get_object(pages[&4]).unwrap().as_dict().unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    assert!(xobjects.get(b"Im1").is_ok());
}

#[test]
fn test_fill_without_matching_widgets_still_succeeds() {
    // A template with a single unrelated field: nothing matches, no error
    let template = create_template(
        &[FieldSpec {
            name: "form1[0].Other[0]",
            ft: b"Tx",
        }],
        4,
    );
    let mapping = build_field_mapping(&sample_report());

    let filled = fill_form(&template, &mapping, &[]).expect("fill failed");
    assert!(widget_entry(&filled, "form1[0].Other[0]", b"V").is_none());
}
