//! Field extraction from daily report JSON
//!
//! Export files are loosely shaped: sections may sit at the top level or
//! under a `DailyReport` wrapper, values arrive as numbers or strings, and
//! some sections are either a list or a bare string. Every accessor here
//! consults both locations and falls back to a safe default.

use serde_json::Value;

/// Extracted weather values with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSummary {
    /// Temperature in degrees Fahrenheit
    pub temperature: f64,
    /// Wind description, e.g. "Calm", "Moderate"
    pub wind: String,
    /// Relative humidity as a percentage
    pub humidity: f64,
    /// Sky conditions, e.g. "Clear", "Rain"
    pub conditions: String,
}

impl Default for WeatherSummary {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            wind: "Calm".to_string(),
            humidity: 50.0,
            conditions: "Clear".to_string(),
        }
    }
}

/// One personnel trade with its aggregate head count and table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeCount {
    pub trade: String,
    pub count: i64,
    /// 1-indexed column in the personnel table
    pub column: usize,
}

/// Aggregated personnel data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonnelSummary {
    /// Contractors in first-appearance order with their daily hours
    pub contractors: Vec<(String, u32)>,
    /// Trade head counts in first-appearance order
    pub trades: Vec<TradeCount>,
}

/// One work item row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkItem {
    pub location: String,
    pub item_no: String,
    pub total: String,
    pub description: String,
}

/// Hours credited to a contractor when any of its personnel are on site
const CONTRACTOR_HOURS: u32 = 8;

/// Look up a section at the top level and under `DailyReport`
fn sections<'a>(data: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    if let Some(value) = data.get(key) {
        found.push(value);
    }
    if let Some(value) = data.get("DailyReport").and_then(|r| r.get(key)) {
        found.push(value);
    }
    found
}

/// Render a JSON value as display text
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Coerce a JSON value to a number, accepting numeric strings
fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_field(obj: &Value, key: &str) -> String {
    obj.get(key).map(value_to_string).unwrap_or_default()
}

/// Collect equipment names, one per line
pub fn equipment(data: &Value) -> String {
    let mut names = Vec::new();

    for section in sections(data, "Equipment") {
        if let Some(items) = section.as_array() {
            for item in items {
                let name = str_field(item, "Name");
                if !name.is_empty() {
                    names.push(name);
                }
            }
        }
    }

    names.join("\n")
}

/// Collect narrative entries as remarks, one per line
///
/// `Narrative` is either a bare string or a list of `{Text, Timestamp}`
/// objects; timestamped entries render as `[timestamp] text`.
pub fn remarks(data: &Value) -> String {
    let mut lines = Vec::new();

    for section in sections(data, "Narrative") {
        match section {
            Value::String(s) => lines.push(s.clone()),
            Value::Array(items) => {
                for item in items {
                    let text = str_field(item, "Text");
                    if text.is_empty() {
                        continue;
                    }
                    let timestamp = str_field(item, "Timestamp");
                    if timestamp.is_empty() {
                        lines.push(text);
                    } else {
                        lines.push(format!("[{timestamp}] {text}"));
                    }
                }
            }
            _ => {}
        }
    }

    lines.join("\n")
}

/// Extract the inspector classification
///
/// `Inspector` may be a single object or a list; the first entry wins.
pub fn classification(data: &Value) -> String {
    match data.get("Inspector") {
        Some(inspector @ Value::Object(_)) => str_field(inspector, "Classification"),
        Some(Value::Array(items)) => items
            .first()
            .map(|i| str_field(i, "Classification"))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Name of the first personnel entry with a "Superintendent" trade
pub fn superintendent(data: &Value) -> Option<String> {
    let personnel = data.get("Personnel")?.as_array()?;

    for person in personnel {
        let trade = str_field(person, "Trade");
        let name = str_field(person, "Name");
        if trade.contains("Superintendent") && !name.is_empty() {
            return Some(name);
        }
    }

    None
}

/// Extract weather values with defaults
pub fn weather(data: &Value) -> WeatherSummary {
    let mut summary = WeatherSummary::default();

    let Some(weather) = data.get("Weather").filter(|w| w.is_object()) else {
        return summary;
    };

    if let Some(temp) = weather.get("Temperature").and_then(value_to_f64) {
        summary.temperature = temp;
    }

    let wind = str_field(weather, "Wind");
    if !wind.is_empty() {
        summary.wind = wind;
    }

    summary.humidity = match weather.get("Humidity") {
        Some(Value::String(s)) => humidity_from_text(s),
        Some(value) => match value_to_f64(value) {
            // Zero reads as "not reported"
            Some(h) if h != 0.0 => h,
            _ => 50.0,
        },
        None => 50.0,
    };

    let conditions = str_field(weather, "Conditions");
    if !conditions.is_empty() {
        summary.conditions = conditions;
    }

    summary
}

/// Map a textual humidity description to a percentage
fn humidity_from_text(text: &str) -> f64 {
    let lower = text.to_lowercase();
    if lower.contains("dry") {
        25.0
    } else if lower.contains("low") {
        35.0
    } else if lower.contains("medium") || lower.contains("med") {
        60.0
    } else if lower.contains("high") {
        80.0
    } else {
        50.0
    }
}

/// Aggregate personnel into contractor hours and per-trade head counts
///
/// Contractors are credited a fixed workday when any of their personnel
/// are present. Blank trades count as "Laborer". Trades outside the
/// standard set are assigned the next free personnel-table column, and
/// that assignment persists for the rest of the report.
pub fn personnel(data: &Value) -> PersonnelSummary {
    let mut summary = PersonnelSummary::default();

    let Some(people) = data.get("Personnel").and_then(|p| p.as_array()) else {
        return summary;
    };

    // Standard trade columns; Superintendent shares the Supervisors column
    let mut columns: Vec<(String, usize)> = vec![
        ("Supervisor".to_string(), 1),
        ("Superintendent".to_string(), 1),
        ("Operator".to_string(), 2),
        ("Truck Driver".to_string(), 3),
        ("Laborer".to_string(), 4),
    ];

    for person in people {
        if !person.is_object() {
            continue;
        }

        let contractor = str_field(person, "Contractor");
        if contractor.is_empty() {
            continue;
        }

        if !summary.contractors.iter().any(|(c, _)| *c == contractor) {
            summary.contractors.push((contractor, CONTRACTOR_HOURS));
        }

        let mut trade = str_field(person, "Trade");
        if trade.trim().is_empty() {
            trade = "Laborer".to_string();
        }

        let column = match columns.iter().find(|(t, _)| *t == trade) {
            Some((_, col)) => *col,
            None => {
                let next = columns.iter().map(|(_, c)| *c).max().unwrap_or(4) + 1;
                columns.push((trade.clone(), next));
                next
            }
        };

        let count = person
            .get("Count")
            .and_then(value_to_f64)
            .map(|c| c as i64)
            .unwrap_or(1);

        match summary.trades.iter_mut().find(|t| t.trade == trade) {
            Some(entry) => entry.count += count,
            None => summary.trades.push(TradeCount {
                trade,
                count,
                column,
            }),
        }
    }

    summary
}

/// Extract work item rows
///
/// A description of the form `0010: MOBILIZATION` splits into the item
/// number and the remaining description. The total renders as
/// `"quantity units"`, just the quantity, or empty.
pub fn work_items(data: &Value) -> Vec<WorkItem> {
    let Some(items) = data.get("WorkItems").and_then(|w| w.as_array()) else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| {
            let mut description = str_field(item, "Description");
            let mut item_no = String::new();
            if let Some((no, rest)) = description.split_once(':') {
                item_no = no.trim().to_string();
                description = rest.trim().to_string();
            }

            // A numeric zero means "no quantity"; any non-empty string
            // counts, including "0"
            let quantity_value = item.get("Quantity");
            let has_quantity = match quantity_value {
                Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
                Some(Value::String(s)) => !s.is_empty(),
                Some(Value::Bool(b)) => *b,
                _ => false,
            };
            let quantity = quantity_value.map(value_to_string).unwrap_or_default();
            let units = str_field(item, "Units");

            let total = if has_quantity && !units.is_empty() {
                format!("{quantity} {units}")
            } else if has_quantity {
                quantity
            } else {
                String::new()
            };

            WorkItem {
                location: str_field(item, "Location"),
                item_no,
                total,
                description,
            }
        })
        .collect()
}
