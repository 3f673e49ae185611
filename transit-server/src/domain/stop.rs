//! Transit stop.

/// A physical stop, with the routes that serve it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    route_ids: Vec<String>,
}

impl Stop {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lon,
            route_ids: Vec::new(),
        }
    }

    /// Record a route serving this stop. Duplicates are ignored.
    pub(crate) fn add_route_id(&mut self, route_id: &str) {
        if !self.route_ids.iter().any(|r| r == route_id) {
            self.route_ids.push(route_id.to_string());
        }
    }

    /// Ids of the routes serving this stop, in linking order.
    pub fn route_ids(&self) -> &[String] {
        &self.route_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_route_id_ignores_duplicates() {
        let mut stop = Stop::new("S1", "Termini", 41.901, 12.501);
        stop.add_route_id("64");
        stop.add_route_id("40");
        stop.add_route_id("64");

        assert_eq!(stop.route_ids(), ["64", "40"]);
    }
}
