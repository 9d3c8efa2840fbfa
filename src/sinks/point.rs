use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::sources::readings::Reading;

/// One time-series record as handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    pub fn from_reading(measurement: &str, tags: &BTreeMap<String, String>, reading: &Reading) -> Self {
        let fields = BTreeMap::from([
            ("power".to_owned(), reading.power),
            ("powerPhase1".to_owned(), reading.power_phase1),
            ("powerPhase2".to_owned(), reading.power_phase2),
            ("powerPhase3".to_owned(), reading.power_phase3),
            ("energyReading".to_owned(), reading.energy_reading),
        ]);
        Self {
            measurement: measurement.to_owned(),
            tags: tags.clone(),
            fields,
            timestamp: reading.date_time,
        }
    }

    /// InfluxDB line protocol with second precision. Empty tag values and
    /// non-finite fields are left out; `None` if no field remains.
    pub fn to_line_protocol(&self) -> Option<String> {
        let fields: Vec<String> = self
            .fields
            .iter()
            .filter(|(_, value)| value.is_finite())
            .map(|(key, value)| format!("{}={}", escape_key(key), value))
            .collect();
        if fields.is_empty() {
            return None;
        }

        let mut line = escape_measurement(&self.measurement);
        for (key, value) in self.tags.iter().filter(|(_, value)| !value.is_empty()) {
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }
        line.push(' ');
        line.push_str(&fields.join(","));
        line.push(' ');
        line.push_str(&self.timestamp.timestamp().to_string());
        Some(line)
    }
}

fn escape_measurement(value: &str) -> String {
    value.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(value: &str) -> String {
    value
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn reading() -> Reading {
        Reading {
            date_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            power: 1.5,
            power_phase1: 0.5,
            power_phase2: 0.25,
            power_phase3: 0.75,
            energy_reading: 1234.0,
        }
    }

    #[test]
    fn line_protocol_with_meter_tag() {
        let tags = BTreeMap::from([("meter".to_owned(), "basement east".to_owned())]);
        let point = Point::from_reading("energy", &tags, &reading());
        assert_eq!(
            point.to_line_protocol().unwrap(),
            "energy,meter=basement\\ east energyReading=1234,power=1.5,powerPhase1=0.5,powerPhase2=0.25,powerPhase3=0.75 1704067200"
        );
    }

    #[test]
    fn empty_tag_is_left_out() {
        let tags = BTreeMap::from([("meter".to_owned(), String::new())]);
        let line = Point::from_reading("energy", &tags, &reading()).to_line_protocol().unwrap();
        assert!(line.starts_with("energy energyReading="));
    }

    #[test]
    fn point_without_finite_fields_is_dropped() {
        let mut point = Point::from_reading("energy", &BTreeMap::new(), &reading());
        point.fields.values_mut().for_each(|value| *value = f64::NAN);
        assert!(point.to_line_protocol().is_none());
    }
}
