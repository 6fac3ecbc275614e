use crate::booking::model::SearchParams;
use url::form_urlencoded;

/// Build the direct availability URL for a stay.
///
/// The booking engine accepts dates and party composition as query
/// parameters, so search is one navigation instead of a form-filling
/// round-trip. `guests` encodes one letter per guest: `A` per adult, `C`
/// per child, comma-joined (two adults become `A%2CA`).
pub fn build_search_url(base_url: &str, params: &SearchParams) -> String {
    let mut guests: Vec<&str> = Vec::new();
    for _ in 0..params.adults.max(1) {
        guests.push("A");
    }
    for _ in 0..params.children {
        guests.push("C");
    }
    let guests = guests.join(",");

    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("in", &params.checkin_date)
        .append_pair("out", &params.checkout_date)
        .append_pair("guests", &guests)
        .finish();

    let joiner = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base_url, joiner, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParams {
        SearchParams {
            checkin_date: "2026-09-01".to_string(),
            checkout_date: "2026-09-04".to_string(),
            adults: 2,
            children: 0,
        }
    }

    #[test]
    fn appends_to_bare_base() {
        let url = build_search_url("https://book.example/hotel", &params());
        assert_eq!(
            url,
            "https://book.example/hotel?in=2026-09-01&out=2026-09-04&guests=A%2CA"
        );
    }

    #[test]
    fn appends_to_base_with_existing_query() {
        let url = build_search_url("https://book.example/?hotel=h1", &params());
        assert!(url.starts_with("https://book.example/?hotel=h1&in="));
    }

    #[test]
    fn encodes_children_after_adults() {
        let mut p = params();
        p.children = 2;
        let url = build_search_url("https://book.example/h", &p);
        assert!(url.ends_with("guests=A%2CA%2CC%2CC"));
    }

    #[test]
    fn zero_adults_still_sends_one() {
        let mut p = params();
        p.adults = 0;
        let url = build_search_url("https://book.example/h", &p);
        assert!(url.ends_with("guests=A"));
    }
}
