//! Server-rendered HTML pages.
//!
//! Pages are plain strings. Data the browser needs is embedded as a JSON
//! literal inside a `<script>` block, with `</` escaped so record text can
//! never close the script element.

use std::fmt::Write as _;

use fire_map_analytics_models::{IncidentMap, StationMarker};
use fire_map_database_models::LocationRow;
use fire_map_fire_models::FireSeverity;
use serde::Serialize;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Escapes text for use in HTML element content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serializes `value` for embedding inside a `<script>` element.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if `value` fails to serialize.
pub fn embed_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn layout(title: &str, head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
{head}
<style>
body {{ font-family: system-ui, sans-serif; margin: 0; }}
nav {{ background: #b71c1c; padding: 0.75rem 1rem; }}
nav a {{ color: #fff; margin-right: 1rem; text-decoration: none; }}
main {{ padding: 1rem; }}
#map {{ height: 80vh; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid #ddd; padding: 0.4rem 0.8rem; text-align: left; }}
.charts {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 1rem; }}
</style>
</head>
<body>
<nav>
<a href="/">Home</a>
<a href="/dashboard_chart">Dashboard</a>
<a href="/stations">Fire Stations</a>
<a href="/incidents">Incidents</a>
</nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn leaflet_head() -> String {
    format!(
        r#"<link rel="stylesheet" href="{LEAFLET_CSS}">
<script src="{LEAFLET_JS}"></script>"#
    )
}

/// The home page: every registered location.
#[must_use]
pub fn home_page(locations: &[LocationRow]) -> String {
    let mut body = String::from("<h1>Locations</h1>\n");
    if locations.is_empty() {
        body.push_str("<p>No locations have been registered.</p>\n");
    } else {
        body.push_str(
            "<table>\n<thead><tr><th>Name</th><th>Address</th><th>City</th><th>Country</th></tr></thead>\n<tbody>\n",
        );
        for loc in locations {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&loc.name),
                escape_html(&loc.address),
                escape_html(&loc.city),
                escape_html(&loc.country),
            );
        }
        body.push_str("</tbody>\n</table>\n");
    }
    layout("Fire Map", "", &body)
}

/// The dashboard: four charts drawn client-side from the chart endpoints.
#[must_use]
pub fn dashboard_page() -> String {
    let labels: Vec<(String, String)> = FireSeverity::ALL
        .iter()
        .map(|s| (s.code(), s.to_string()))
        .collect();
    let labels: serde_json::Map<String, serde_json::Value> = labels
        .into_iter()
        .map(|(code, label)| (code, serde_json::Value::String(label)))
        .collect();

    let body = format!(
        r#"<h1>Dashboard</h1>
<div class="charts">
<canvas id="pie-chart"></canvas>
<canvas id="line-chart"></canvas>
<canvas id="multiline-chart"></canvas>
<canvas id="bar-chart"></canvas>
</div>
<script>
const severityLabels = {labels};
const label = (code) => severityLabels[code] || code;
const get = (url) => fetch(url).then((r) => r.json());

get("/chart/").then((data) => new Chart(document.getElementById("pie-chart"), {{
  type: "pie",
  data: {{ labels: Object.keys(data).map(label), datasets: [{{ data: Object.values(data) }}] }},
  options: {{ plugins: {{ title: {{ display: true, text: "Incidents by Severity" }} }} }},
}}));

get("/lineChart/").then((data) => new Chart(document.getElementById("line-chart"), {{
  type: "line",
  data: {{ labels: Object.keys(data), datasets: [{{ label: "Incidents", data: Object.values(data) }}] }},
  options: {{ plugins: {{ title: {{ display: true, text: "Incidents per Month" }} }} }},
}}));

const months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
// Month keys are "01".."12"; read them in calendar order.
const series = (byMonth) => months.map((_, i) => byMonth[String(i + 1).padStart(2, "0")] ?? 0);

get("/multilineChart/").then((data) => new Chart(document.getElementById("multiline-chart"), {{
  type: "line",
  data: {{
    labels: months,
    datasets: Object.entries(data).map(([country, byMonth]) => ({{ label: country, data: series(byMonth) }})),
  }},
  options: {{ plugins: {{ title: {{ display: true, text: "Top 3 Countries" }} }} }},
}}));

get("/multiBarChart/").then((data) => new Chart(document.getElementById("bar-chart"), {{
  type: "bar",
  data: {{
    labels: months,
    datasets: Object.entries(data).map(([code, byMonth]) => ({{ label: label(code), data: series(byMonth) }})),
  }},
  options: {{ plugins: {{ title: {{ display: true, text: "Severity by Month" }} }} }},
}}));
</script>
"#,
        labels = serde_json::Value::Object(labels),
    );

    layout(
        "Fire Map Dashboard",
        &format!(r#"<script src="{CHART_JS}"></script>"#),
        &body,
    )
}

/// The fire station map.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the markers fail to serialize.
pub fn station_map_page(stations: &[StationMarker]) -> Result<String, serde_json::Error> {
    let body = format!(
        r#"<h1>Fire Stations</h1>
<div id="map"></div>
<script>
const fireStations = {stations};
const map = L.map("map").setView([10.3157, 123.8854], 6);
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  attribution: "&copy; OpenStreetMap contributors",
}}).addTo(map);
const text = (s) => {{ const el = document.createElement("span"); el.textContent = s; return el; }};
const bounds = [];
for (const station of fireStations) {{
  L.marker([station.latitude, station.longitude]).addTo(map).bindPopup(text(station.name));
  bounds.push([station.latitude, station.longitude]);
}}
if (bounds.length) map.fitBounds(bounds, {{ maxZoom: 13 }});
</script>
"#,
        stations = embed_json(stations)?,
    );
    Ok(layout("Fire Stations", &leaflet_head(), &body))
}

/// The incident map with a city filter.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the map data fails to serialize.
pub fn incident_map_page(map: &IncidentMap) -> Result<String, serde_json::Error> {
    let mut options = String::from("<option value=\"\">All cities</option>\n");
    for city in &map.cities {
        let city = escape_html(city);
        let _ = writeln!(options, "<option value=\"{city}\">{city}</option>");
    }

    let body = format!(
        r#"<h1>Fire Incidents</h1>
<label>City <select id="city-filter">
{options}</select></label>
<div id="map"></div>
<script>
const fireIncidents = {incidents};
const map = L.map("map").setView([10.3157, 123.8854], 6);
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  attribution: "&copy; OpenStreetMap contributors",
}}).addTo(map);
const layer = L.layerGroup().addTo(map);
const popup = (incident) => {{
  const el = document.createElement("div");
  for (const line of [incident.city, incident.description, "Date: " + incident.date, "Severity: " + incident.severity]) {{
    const p = document.createElement("div");
    p.textContent = line;
    el.appendChild(p);
  }}
  return el;
}};
const draw = (city) => {{
  layer.clearLayers();
  const bounds = [];
  for (const incident of fireIncidents) {{
    if (city && incident.city !== city) continue;
    L.marker([incident.latitude, incident.longitude]).addTo(layer).bindPopup(popup(incident));
    bounds.push([incident.latitude, incident.longitude]);
  }}
  if (bounds.length) map.fitBounds(bounds, {{ maxZoom: 13 }});
}};
document.getElementById("city-filter").addEventListener("change", (e) => draw(e.target.value));
draw("");
</script>
"#,
        incidents = embed_json(&map.incidents)?,
    );
    Ok(layout("Fire Incidents", &leaflet_head(), &body))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use fire_map_analytics_models::IncidentMarker;

    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn embedded_json_cannot_close_script() {
        let json = embed_json(&["</script><script>alert(1)"]).unwrap();
        assert!(!json.contains("</script>"));
        assert_eq!(
            serde_json::from_str::<Vec<String>>(&json).unwrap(),
            vec!["</script><script>alert(1)"]
        );
    }

    #[test]
    fn home_page_escapes_location_fields() {
        let at = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let html = home_page(&[LocationRow {
            id: 1,
            name: "<i>Depot</i>".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            address: "A & B".to_string(),
            city: "Cebu".to_string(),
            country: "Philippines".to_string(),
            created_at: at,
            updated_at: at,
        }]);
        assert!(html.contains("&lt;i&gt;Depot&lt;/i&gt;"));
        assert!(html.contains("A &amp; B"));
        assert!(!html.contains("<i>Depot"));
    }

    #[test]
    fn incident_map_lists_cities() {
        let map = IncidentMap {
            incidents: vec![IncidentMarker {
                city: "Cebu".to_string(),
                latitude: 10.3,
                longitude: 123.9,
                description: "Market fire".to_string(),
                date: "N/A".to_string(),
                severity: FireSeverity::Major,
            }],
            cities: vec!["Cebu".to_string()],
        };
        let html = incident_map_page(&map).unwrap();
        assert!(html.contains(r#"<option value="Cebu">Cebu</option>"#));
        assert!(html.contains(r#""date":"N/A""#));
    }

    #[test]
    fn dashboard_loads_every_chart_endpoint() {
        let html = dashboard_page();
        for url in ["/chart/", "/lineChart/", "/multilineChart/", "/multiBarChart/"] {
            assert!(html.contains(url), "missing {url}");
        }
        assert!(html.contains("Minor Fire"));
    }

    #[test]
    fn dashboard_indexes_month_series_by_code() {
        let html = dashboard_page();
        assert!(!html.contains("Object.values(byMonth)"));
        assert_eq!(html.matches("data: series(byMonth)").count(), 2);
        assert!(html.contains(r#"byMonth[String(i + 1).padStart(2, "0")]"#));
    }
}
