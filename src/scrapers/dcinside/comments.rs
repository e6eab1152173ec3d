//! Comments API request construction and response parsing.
//!
//! Comments come from `POST /board/comment/` as JSON. The documented shape
//! is `{"comments": [...]}`, but a bare array has been observed, so the
//! parser accepts both. An empty list signals end-of-thread.

use serde_json::Value;

use super::url::PlatformPostId;

/// One item of a comment page, as delivered by the upstream.
#[derive(Debug, Clone, Default)]
pub struct RawComment {
    /// Comment number. Control rows (ad banners, pagination stubs) have none.
    pub no: Option<String>,
    /// `del_yn == "Y"`.
    pub deleted: bool,
    /// HTML snippet of the body.
    pub memo: String,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub ip: Option<String>,
    pub reg_date: Option<String>,
}

/// Form body for one comment page request. Field set is fixed by the
/// upstream endpoint; `sort` stays `N` (newest-first as served).
pub fn comment_request_form(
    id: &PlatformPostId,
    esno: &str,
    page: u32,
) -> Vec<(String, String)> {
    let gallery_id = id.gallery_id.clone();
    let post_no = id.post_no.to_string();
    vec![
        ("id".into(), gallery_id.clone()),
        ("no".into(), post_no.clone()),
        ("cmt_id".into(), gallery_id),
        ("cmt_no".into(), post_no),
        ("focus_cno".into(), String::new()),
        ("focus_pno".into(), String::new()),
        ("e_s_n_o".into(), esno.to_string()),
        ("comment_page".into(), page.to_string()),
        ("sort".into(), "N".into()),
        ("prevCnt".into(), String::new()),
        ("board_type".into(), String::new()),
        ("_GALLTYPE_".into(), id.gall_type.code().into()),
    ]
}

fn string_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_item(item: &Value) -> RawComment {
    RawComment {
        no: string_field(item, "no"),
        deleted: item.get("del_yn").and_then(Value::as_str) == Some("Y"),
        memo: item
            .get("memo")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        user_id: string_field(item, "user_id"),
        name: string_field(item, "name"),
        ip: string_field(item, "ip"),
        reg_date: string_field(item, "reg_date"),
    }
}

/// Parse a comments API response. Unrecognized shapes yield an empty list,
/// which the collector treats as end-of-thread.
pub fn parse_comment_response(value: &Value) -> Vec<RawComment> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => match value.get("comments") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    items.iter().map(parse_item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pid() -> PlatformPostId {
        "DC&M&programming&42".parse().unwrap()
    }

    #[test]
    fn test_request_form_fields() {
        let form = comment_request_form(&pid(), "token123", 3);
        let get = |k: &str| {
            form.iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };
        assert_eq!(get("id"), "programming");
        assert_eq!(get("no"), "42");
        assert_eq!(get("cmt_id"), "programming");
        assert_eq!(get("cmt_no"), "42");
        assert_eq!(get("focus_cno"), "");
        assert_eq!(get("e_s_n_o"), "token123");
        assert_eq!(get("comment_page"), "3");
        assert_eq!(get("sort"), "N");
        assert_eq!(get("_GALLTYPE_"), "M");
    }

    #[test]
    fn test_galltype_defaults_to_general() {
        let id: PlatformPostId = "DC&G&pro&1".parse().unwrap();
        let form = comment_request_form(&id, "t", 1);
        assert!(form.contains(&("_GALLTYPE_".to_string(), "G".to_string())));
    }

    #[test]
    fn test_parse_object_form() {
        let value = json!({
            "comments": [
                {"no": "11", "del_yn": "N", "memo": "<em>hi</em>", "name": "ㅇㅇ",
                 "ip": "1.2", "reg_date": "09.01 12:34:56"},
                {"no": 12, "del_yn": "Y", "memo": "", "user_id": "acct"}
            ]
        });
        let comments = parse_comment_response(&value);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].no.as_deref(), Some("11"));
        assert!(!comments[0].deleted);
        assert_eq!(comments[0].memo, "<em>hi</em>");
        // Numeric comment numbers are normalized to strings.
        assert_eq!(comments[1].no.as_deref(), Some("12"));
        assert!(comments[1].deleted);
        assert_eq!(comments[1].user_id.as_deref(), Some("acct"));
    }

    #[test]
    fn test_parse_bare_array_form() {
        let value = json!([{"no": "1", "memo": "x"}]);
        assert_eq!(parse_comment_response(&value).len(), 1);
    }

    #[test]
    fn test_control_row_has_no_number() {
        let value = json!({"comments": [{"memo": "ad banner"}]});
        let comments = parse_comment_response(&value);
        assert_eq!(comments[0].no, None);
    }

    #[test]
    fn test_empty_and_malformed_responses() {
        assert!(parse_comment_response(&json!({"comments": []})).is_empty());
        assert!(parse_comment_response(&json!({"total_cnt": 0})).is_empty());
        assert!(parse_comment_response(&json!("nope")).is_empty());
    }
}
