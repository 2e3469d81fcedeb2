use crate::access::Value;
use crate::catalog::Field;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier assigned to a record by the store
pub type RecordId = u64;

/// One row of the advertising performance dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub id: RecordId,
    pub campaign: String,
    pub data_source: String,
    pub daily: NaiveDate,
    pub clicks: i32,
    pub impressions: i32,
}

impl AdRecord {
    /// Create a record that has not been assigned an id yet
    pub fn new(
        data_source: impl Into<String>,
        campaign: impl Into<String>,
        daily: NaiveDate,
        clicks: i32,
        impressions: i32,
    ) -> Self {
        Self {
            id: 0,
            campaign: campaign.into(),
            data_source: data_source.into(),
            daily,
            clicks,
            impressions,
        }
    }

    /// Read a column of this record
    pub fn get(&self, field: Field) -> Value {
        match field {
            Field::Clicks => Value::Integer(i64::from(self.clicks)),
            Field::Impressions => Value::Integer(i64::from(self.impressions)),
            Field::Campaign => Value::String(self.campaign.clone()),
            Field::DataSource => Value::String(self.data_source.clone()),
            Field::Daily => Value::Date(self.daily),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_field() {
        let day = NaiveDate::from_ymd_opt(2019, 11, 12).unwrap();
        let record = AdRecord::new("Google Ads", "Adventmarkt Touristik", day, 7, 22425);

        assert_eq!(record.id, 0);
        assert_eq!(record.get(Field::DataSource), Value::from("Google Ads"));
        assert_eq!(
            record.get(Field::Campaign),
            Value::from("Adventmarkt Touristik")
        );
        assert_eq!(record.get(Field::Daily), Value::Date(day));
        assert_eq!(record.get(Field::Clicks), Value::Integer(7));
        assert_eq!(record.get(Field::Impressions), Value::Integer(22425));
    }
}
