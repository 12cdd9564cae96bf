//! Tests for model encodings at the library boundary.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde_json::json;
use slot_engine::model::{
    parse_time_of_day, CalendarItem, DayKey, ItemKind, RepeatRule, RequestConfiguration, TimeRange,
};
use slot_engine::SlotError;

#[test]
fn day_keys_are_sunday_first() {
    assert_eq!(DayKey::Sun.index(), 0);
    assert_eq!(DayKey::Sat.index(), 6);
    assert_eq!(DayKey::from(Weekday::Sun), DayKey::Sun);
    assert_eq!(DayKey::from(Weekday::Wed), DayKey::Wed);
    assert_eq!(DayKey::from_index(1), Some(DayKey::Mon));
    assert_eq!(DayKey::from_index(7), None);
    // 2026-03-16 is a Monday.
    assert_eq!(DayKey::of(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()), DayKey::Mon);
}

#[test]
fn day_keys_parse_and_serialize_uppercase() {
    assert_eq!("thu".parse::<DayKey>().unwrap(), DayKey::Thu);
    assert!("THURSDAY".parse::<DayKey>().is_err());
    assert_eq!(serde_json::to_value(DayKey::Fri).unwrap(), json!("FRI"));
}

#[test]
fn time_of_day_uses_hh_mm() {
    assert_eq!(
        parse_time_of_day("09:30").unwrap(),
        NaiveTime::from_hms_opt(9, 30, 0).unwrap()
    );
    assert_eq!(
        parse_time_of_day("9h30"),
        Err(SlotError::InvalidTimeOfDay("9h30".to_string()))
    );

    let range = TimeRange::parse("09:00", "17:30").unwrap();
    assert_eq!(
        serde_json::to_value(range).unwrap(),
        json!({"start": "09:00", "end": "17:30"})
    );
    assert_eq!(range.to_string(), "09:00-17:30");
}

#[test]
fn time_range_rejects_bad_strings_when_deserialized() {
    let result: Result<TimeRange, _> = serde_json::from_value(json!({"start": "25:00", "end": "26:00"}));
    assert!(result.is_err());
}

#[test]
fn calendar_items_are_tagged_by_kind() {
    let items: Vec<CalendarItem> = serde_json::from_value(json!([
        {
            "id": "lunch",
            "title": "Lunch",
            "start": "2026-03-16T12:00:00",
            "end": "2026-03-16T13:00:00",
            "kind": "plain"
        },
        {
            "id": "gym",
            "title": "Gym",
            "start": "2026-03-16T07:00:00",
            "end": "2026-03-16T08:00:00",
            "allDay": false,
            "color": "#FF0000",
            "kind": "recurring",
            "repeatDays": ["MON", "WED"],
            "repeatEndDate": "2026-04-30"
        },
        {
            "id": "gym_20260318",
            "title": "Gym",
            "start": "2026-03-18T07:00:00",
            "end": "2026-03-18T08:00:00",
            "kind": "derived",
            "templateId": "gym",
            "occurrenceDate": "2026-03-18"
        }
    ]))
    .unwrap();

    assert_eq!(items[0].kind, ItemKind::Plain);
    assert_eq!(
        items[1].kind,
        ItemKind::Recurring(RepeatRule::new(
            [DayKey::Mon, DayKey::Wed],
            NaiveDate::from_ymd_opt(2026, 4, 30).unwrap()
        ))
    );
    assert_eq!(items[1].color.as_deref(), Some("#FF0000"));
    assert!(items[2].is_derived());
    assert!(items[2].active_rule().is_none());
}

#[test]
fn calendar_item_without_kind_is_plain() {
    let item: CalendarItem = serde_json::from_value(json!({
        "id": "a",
        "title": "A",
        "start": "2026-03-16T12:00:00",
        "end": "2026-03-16T13:00:00"
    }))
    .unwrap();

    assert_eq!(item.kind, ItemKind::Plain);
    assert!(!item.all_day);
    assert_eq!(item.color, None);
}

#[test]
fn recurring_item_without_repeat_end_date_is_rejected() {
    let result: Result<CalendarItem, _> = serde_json::from_value(json!({
        "id": "gym",
        "title": "Gym",
        "start": "2026-03-16T07:00:00",
        "end": "2026-03-16T08:00:00",
        "kind": "recurring",
        "repeatDays": ["MON"]
    }));

    let message = result.unwrap_err().to_string();
    assert!(message.contains("repeatEndDate"), "{message}");
}

#[test]
fn emoji_and_request_link_survive_serialization() {
    let stamp = CalendarItem::recurring(
        "gym",
        "Gym",
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap().and_hms_opt(7, 0, 0).unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap().and_hms_opt(8, 0, 0).unwrap(),
        RepeatRule::new([DayKey::Mon], NaiveDate::from_ymd_opt(2026, 4, 30).unwrap()),
    )
    .with_emoji("🏋️")
    .with_request_id("req-1");

    let value = serde_json::to_value(&stamp).unwrap();
    assert_eq!(value["emoji"], "🏋️");
    assert_eq!(value["requestId"], "req-1");
    assert_eq!(value["kind"], "recurring");
    assert_eq!(value["repeatEndDate"], "2026-04-30");

    let back: CalendarItem = serde_json::from_value(value).unwrap();
    assert_eq!(back, stamp);

    let plain = serde_json::to_value(CalendarItem::plain("a", "A", stamp.start, stamp.end)).unwrap();
    assert!(plain.get("emoji").is_none());
    assert!(plain.get("requestId").is_none());
}

#[test]
fn request_configuration_defaults_margin_to_zero() {
    let config: RequestConfiguration = serde_json::from_value(json!({
        "dateRanges": [{"start": "2026-03-16", "end": "2026-03-20"}],
        "timeRanges": [{"start": "09:00", "end": "17:00"}],
        "desiredDurationMinutes": 30,
        "desiredMemberCount": 2
    }))
    .unwrap();

    assert_eq!(config.desired_margin_minutes, 0);
    assert!(config.validate().is_ok());
    assert_eq!(config.duration().num_minutes(), 30);
}
