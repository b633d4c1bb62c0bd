use crate::models::Location;

/// Keep only results that carry a house number, i.e. point at a building
/// rather than a street or an area. Order is preserved; an empty result is a
/// valid outcome.
#[must_use]
pub fn filter_buildings(locations: Vec<Location>) -> Vec<Location> {
    locations
        .into_iter()
        .filter(|location| location.house_number.is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str, house_number: Option<&str>) -> Location {
        Location {
            full_name: name.to_string(),
            lat: 1.0,
            lon: 2.0,
            house_number: house_number.map(str::to_string),
        }
    }

    #[test]
    fn test_keeps_buildings_in_order() {
        let filtered = filter_buildings(vec![
            location("1 First St", Some("1")),
            location("Second St", None),
            location("3 Third St", Some("3")),
            location("Fourth Ave", None),
            location("5 Fifth Ave", Some("5a")),
        ]);
        let names: Vec<&str> = filtered.iter().map(|l| l.full_name.as_str()).collect();
        assert_eq!(names, vec!["1 First St", "3 Third St", "5 Fifth Ave"]);
    }

    #[test]
    fn test_no_building_gives_empty_result() {
        let filtered = filter_buildings(vec![location("Main St", None), location("Town", None)]);
        assert!(filtered.is_empty());
    }
}
