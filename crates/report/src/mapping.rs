//! ODOT field-name mapping
//!
//! Builds the flat map from fully-qualified XFA field names to values.
//! The names follow the template's form hierarchy, e.g.
//! `form1[0].Page1[0].WeatherSub[0].Weather[0].Row2[0].Cell3[0]`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::extract;
use crate::workdate::WorkDate;

const WEATHER_TABLE: &str = "form1[0].Page1[0].WeatherSub[0].Weather[0]";
const CONTRACTOR_TABLE: &str =
    "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].ContractorTable[0]";
const PERSONNEL_TABLE: &str =
    "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0].PersonnelTable1[0]";
const LOCATION_TABLE: &str = "form1[0].Page1[0].TableSub2[0].Place[0].LocationTable1[0]";
const PERS_GROUP: &str = "form1[0].Page1[0].TableSub1[0].Table1[0].PersGroup[0]";

/// Pages carrying the footer master subform
const FOOTER_PAGES: usize = 3;
const MAX_CONTRACTOR_ROWS: usize = 10;
const MAX_TRADE_COLUMNS: usize = 10;
const MAX_WORK_ITEMS: usize = 20;

/// Value for a single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text or signature field content
    Text(String),
    /// Checkbox state
    Check(bool),
}

impl FieldValue {
    fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }
}

/// The complete set of values to apply to the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    /// Field name to value, iterated in name order
    pub fields: BTreeMap<String, FieldValue>,
    /// Selected weekday, e.g. "Tuesday"
    pub weekday: String,
    /// Appearance state name of the selected weekday widget, "1".."7"
    pub weekday_appearance: String,
}

impl FieldMapping {
    fn set_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), FieldValue::text(value));
    }

    fn set_check(&mut self, name: impl Into<String>, on: bool) {
        self.fields.insert(name.into(), FieldValue::Check(on));
    }

    /// Look up a field value by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Pick the checked temperature cell on row 2
fn temperature_cell(temperature: f64) -> u32 {
    if temperature >= 83.0 {
        1
    } else if temperature >= 70.0 {
        2
    } else if temperature >= 50.0 {
        3
    } else if temperature >= 32.0 {
        4
    } else {
        5
    }
}

/// Pick the checked wind cell on row 3
fn wind_cell(wind: &str) -> u32 {
    let wind = wind.to_lowercase();
    if wind.contains("strong") || wind.contains("high") {
        3
    } else if wind.contains("moderate") || wind.contains("medium") {
        2
    } else {
        1
    }
}

/// Pick the checked humidity cell on row 4
fn humidity_cell(humidity: f64) -> u32 {
    if humidity >= 75.0 {
        4
    } else if humidity >= 50.0 {
        3
    } else if humidity >= 25.0 {
        2
    } else {
        1
    }
}

/// Pick the checked conditions cell on row 1
fn conditions_cell(conditions: &str) -> u32 {
    let conditions = conditions.to_lowercase();
    if conditions.contains("rain") || conditions.contains("shower") {
        4
    } else if conditions.contains("snow") {
        5
    } else if conditions.contains("cloudy") || conditions.contains("overcast") {
        3
    } else if conditions.contains("fair") || conditions.contains("partly") {
        2
    } else {
        1
    }
}

/// Build the full field mapping for one report
pub fn build_field_mapping(data: &Value) -> FieldMapping {
    let mut mapping = FieldMapping::default();

    let work_date = WorkDate::from_report(data);
    mapping.weekday = work_date.weekday_name().to_string();
    mapping.weekday_appearance = work_date.weekday_appearance().to_string();

    // Weather grid, one cell checked per row
    let weather = extract::weather(data);
    mapping.set_check(
        format!(
            "{WEATHER_TABLE}.Row1[0].Cell{}[0]",
            conditions_cell(&weather.conditions)
        ),
        true,
    );
    mapping.set_check(
        format!(
            "{WEATHER_TABLE}.Row2[0].Cell{}[0]",
            temperature_cell(weather.temperature)
        ),
        true,
    );
    mapping.set_check(
        format!("{WEATHER_TABLE}.Row3[0].Cell{}[0]", wind_cell(&weather.wind)),
        true,
    );
    mapping.set_check(
        format!(
            "{WEATHER_TABLE}.Row4[0].Cell{}[0]",
            humidity_cell(weather.humidity)
        ),
        true,
    );

    // Contractor hours on the left, trade head counts on the right
    let personnel = extract::personnel(data);
    for (row, (contractor, hours)) in personnel
        .contractors
        .iter()
        .take(MAX_CONTRACTOR_ROWS)
        .enumerate()
    {
        mapping.set_text(
            format!("{CONTRACTOR_TABLE}.Row{row}[0].Cell1[0]"),
            contractor.clone(),
        );
        mapping.set_text(
            format!("{CONTRACTOR_TABLE}.Row{row}[0].Cell2[0]"),
            hours.to_string(),
        );
    }
    for trade in &personnel.trades {
        if trade.column <= MAX_TRADE_COLUMNS {
            mapping.set_text(
                format!("{PERSONNEL_TABLE}.Row2[0].Cell{}[0]", trade.column),
                trade.count.to_string(),
            );
        }
    }

    // Work item rows
    for (row, item) in extract::work_items(data)
        .iter()
        .take(MAX_WORK_ITEMS)
        .enumerate()
    {
        mapping.set_text(
            format!("{LOCATION_TABLE}.Row{row}[0].Cell1[0]"),
            item.location.clone(),
        );
        mapping.set_text(
            format!("{LOCATION_TABLE}.Row{row}[0].Cell2[0]"),
            item.item_no.clone(),
        );
        mapping.set_text(
            format!("{LOCATION_TABLE}.Row{row}[0].Cell3[0]"),
            item.total.clone(),
        );
        mapping.set_text(
            format!("{LOCATION_TABLE}.Row{row}[0].Cell4[0]"),
            item.description.clone(),
        );
    }

    // On-site supervisor, with the yes/no checkbox pair
    let supervisor_present = match extract::superintendent(data) {
        Some(name) => {
            mapping.set_text("form1[0].Page1[0].ProjectSub[0].#area[0].Contractor[1]", name);
            true
        }
        None => false,
    };
    mapping.set_check(format!("{PERS_GROUP}.PhotoYes[0]"), supervisor_present);
    mapping.set_check(format!("{PERS_GROUP}.PhotoNo[0]"), !supervisor_present);

    // Remarks and equipment blocks
    let remarks = extract::remarks(data);
    if !remarks.is_empty() {
        mapping.set_text("form1[0].#subform[1].RemarksSub1[0].Remarks[0]", remarks);
    }
    let equipment = extract::equipment(data);
    if !equipment.is_empty() {
        mapping.set_text("form1[0].Page1[0].EquipSub1[0].Equip[0]", equipment);
    }

    // Footer on every report page
    let classification = extract::classification(data);
    let formatted_date = work_date.display();
    for page in 0..FOOTER_PAGES {
        let footer = format!("form1[0].#pageSet[0].Master1[{page}].SignSub[0].#area[0]");
        mapping.set_text(format!("{footer}.WorkDate[0]"), formatted_date.clone());
        mapping.set_text(format!("{footer}.Shift[0]"), "Day");
        mapping.set_text(format!("{footer}.PreparedBy[0]"), "Admin HHPR");
        mapping.set_text(format!("{footer}.CertNo[0]"), classification.clone());
        mapping.set_text(format!("{footer}.Signature[0]"), "");
    }

    mapping
}
