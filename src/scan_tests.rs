#[cfg(test)]
mod tests {
    use crate::record::normalize_column;
    use crate::scan::{
        ColumnScanner, ConvertError, MemoryRows, ScanError, Scannable, scan_one, scan_slice,
        scan_value,
    };
    use crate::scan_struct;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct NameCount {
        name: String,
        count: i64,
    }

    scan_struct! {
        impl NameCount {
            name: String { sql: None, json: None },
            count: i64 { sql: None, json: None },
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Tagged {
        id: u64,
        nick: Option<String>,
        score: f64,
    }

    scan_struct! {
        impl Tagged {
            id: u64 { sql: Some("user_id"), json: Some("id") },
            nick: Option<String> { sql: None, json: Some("nickname,omitempty") },
            score: f64 { sql: None, json: None },
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Base {
        id: i64,
        created: String,
    }

    scan_struct! {
        impl Base {
            id: i64 { sql: None, json: None },
            created: String { sql: Some("created_at"), json: None },
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Pet {
        base: Base,
        name: String,
    }

    scan_struct! {
        impl Pet {
            name: String { sql: None, json: None },
        }
        embed {
            base: Base,
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Owner {
        pet: Pet,
        owner: String,
    }

    scan_struct! {
        impl Owner {
            owner: String { sql: None, json: None },
        }
        embed {
            pet: Pet,
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Shadow {
        base: Base,
        id: i64,
    }

    scan_struct! {
        impl Shadow {
            id: i64 { sql: None, json: None },
        }
        embed {
            base: Base,
        }
    }

    #[test]
    fn scan_string_slice() {
        let mut rows = MemoryRows::new(["name"]).add_row(["foo"]).add_row(["bar"]);
        let names: Vec<String> = scan_slice(&mut rows).unwrap();
        assert_eq!(names, vec!["foo", "bar"]);
    }

    #[test]
    fn scan_int_slice() {
        let mut rows = MemoryRows::new(["age"])
            .add_row([1_i64])
            .add_row([2_i64])
            .add_row([3_i64]);
        let ages: Vec<i32> = scan_slice(&mut rows).unwrap();
        assert_eq!(ages, vec![1, 2, 3]);
    }

    #[test]
    fn scan_option_slice_keeps_nulls() {
        let mut rows = MemoryRows::new(["nick"])
            .add_row([SqlValue::from("a")])
            .add_row([SqlValue::Null]);
        let nicks: Vec<Option<String>> = scan_slice(&mut rows).unwrap();
        assert_eq!(nicks, vec![Some("a".to_string()), None]);
    }

    #[test]
    fn scan_struct_slice() {
        let mut rows = MemoryRows::new(["name", "COUNT(*)"])
            .add_row([SqlValue::from("foo"), SqlValue::from(1_i64)])
            .add_row([SqlValue::from("bar"), SqlValue::from(2_i64)]);
        let got: Vec<NameCount> = scan_slice(&mut rows).unwrap();
        assert_eq!(
            got,
            vec![
                NameCount {
                    name: "foo".into(),
                    count: 1
                },
                NameCount {
                    name: "bar".into(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn scan_boxed_struct_slice() {
        let mut rows =
            MemoryRows::new(["NAME", "count"]).add_row([SqlValue::from("foo"), SqlValue::from(7_i64)]);
        let got: Vec<Box<NameCount>> = scan_slice(&mut rows).unwrap();
        assert_eq!(
            got,
            vec![Box::new(NameCount {
                name: "foo".into(),
                count: 7
            })]
        );
    }

    #[test]
    fn scan_struct_partial_columns_keep_defaults() {
        let mut rows = MemoryRows::new(["count"]).add_row([3_i64]);
        let got: Vec<NameCount> = scan_slice(&mut rows).unwrap();
        assert_eq!(
            got,
            vec![NameCount {
                name: String::new(),
                count: 3
            }]
        );
    }

    #[test]
    fn scan_struct_tag_overrides() {
        let mut rows = MemoryRows::new(["user_id", "nickname", "score"])
            .add_row([SqlValue::from(9_i64), SqlValue::from("n"), SqlValue::from(1.5)])
            .add_row([SqlValue::from(10_i64), SqlValue::Null, SqlValue::Null]);
        let got: Vec<Tagged> = scan_slice(&mut rows).unwrap();
        assert_eq!(
            got,
            vec![
                Tagged {
                    id: 9,
                    nick: Some("n".into()),
                    score: 1.5
                },
                Tagged {
                    id: 10,
                    nick: None,
                    score: 0.0
                },
            ]
        );
    }

    #[test]
    fn scan_struct_slot_nilability() {
        let columns = vec!["user_id".to_string(), "nickname".to_string()];
        let scan = Tagged::scan_type(&columns).unwrap();
        let nilable: Vec<bool> = scan.columns().iter().map(|s| s.nilable).collect();
        assert_eq!(nilable, vec![false, true]);
    }

    #[test]
    fn scan_struct_embedded_fields() {
        let mut rows = MemoryRows::new(["id", "created_at", "name"]).add_row([
            SqlValue::from(1_i64),
            SqlValue::from("2024-01-01"),
            SqlValue::from("pedro"),
        ]);
        let got: Vec<Pet> = scan_slice(&mut rows).unwrap();
        assert_eq!(
            got,
            vec![Pet {
                base: Base {
                    id: 1,
                    created: "2024-01-01".into()
                },
                name: "pedro".into(),
            }]
        );
    }

    #[test]
    fn scan_struct_embeds_one_level_only() {
        let mut rows = MemoryRows::new(["owner", "name"])
            .add_row([SqlValue::from("a8m"), SqlValue::from("pedro")]);
        let got: Vec<Owner> = scan_slice(&mut rows).unwrap();
        assert_eq!(got[0].owner, "a8m");
        assert_eq!(got[0].pet.name, "pedro");

        let mut rows = MemoryRows::new(["id"]).add_row([1_i64]);
        let err = scan_slice::<Owner, _>(&mut rows).unwrap_err();
        assert!(matches!(err, ScanError::MissingField { .. }));
    }

    #[test]
    fn scan_struct_direct_field_shadows_embedded() {
        let mut rows = MemoryRows::new(["id", "created_at"])
            .add_row([SqlValue::from(7_i64), SqlValue::from("2024-01-01")]);
        let got: Vec<Shadow> = scan_slice(&mut rows).unwrap();
        assert_eq!(
            got,
            vec![Shadow {
                base: Base {
                    id: 0,
                    created: "2024-01-01".into()
                },
                id: 7,
            }]
        );
    }

    #[test]
    fn scan_struct_missing_field() {
        let mut rows = MemoryRows::new(["name", "age"]).add_row([SqlValue::from("a"), SqlValue::from(1_i64)]);
        let err = scan_slice::<NameCount, _>(&mut rows).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sql/scan: missing struct field for column: age (age)"
        );
    }

    #[test]
    fn scan_columns_mismatch() {
        let mut rows = MemoryRows::new(["a", "b"]).add_row([1_i64, 2_i64]);
        let err = scan_slice::<i64, _>(&mut rows).unwrap_err();
        assert_eq!(err.to_string(), "sql/scan: columns do not match (2 > 1)");
    }

    #[test]
    fn scan_decode_error_names_column() {
        let mut rows = MemoryRows::new(["count"]).add_row(["many"]);
        let err = scan_slice::<NameCount, _>(&mut rows).unwrap_err();
        match err {
            ScanError::Decode { column, source } => {
                assert_eq!(column, "count");
                assert!(matches!(source, ConvertError::Invalid { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn scan_null_into_plain_scalar_fails() {
        let mut rows = MemoryRows::new(["age"]).add_row([SqlValue::Null]);
        let err = scan_slice::<i64, _>(&mut rows).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Decode {
                source: ConvertError::Unsupported { from: "NULL", .. },
                ..
            }
        ));
    }

    #[test]
    fn scan_slice_surfaces_source_error() {
        let mut rows = MemoryRows::new(["name"])
            .add_row(["foo"])
            .with_error("connection reset");
        let err = scan_slice::<String, _>(&mut rows).unwrap_err();
        assert!(matches!(err, ScanError::Source(_)));
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn scan_slice_without_columns() {
        let mut rows = MemoryRows::default();
        let err = scan_slice::<String, _>(&mut rows).unwrap_err();
        assert!(matches!(err, ScanError::NoColumns));
    }

    #[test]
    fn scan_one_value() {
        let mut rows = MemoryRows::new(["COUNT(*)"]).add_row([42_i64]);
        let n: i64 = scan_one(&mut rows).unwrap();
        assert_eq!(n, 42);

        let mut rows = MemoryRows::new(["name"]).add_row(["foo"]);
        assert_eq!(scan_value(&mut rows).unwrap(), SqlValue::from("foo"));
    }

    #[test]
    fn scan_one_errors() {
        let mut rows = MemoryRows::new(["a", "b"]).add_row([1_i64, 2_i64]);
        let err = scan_one::<i64, _>(&mut rows).unwrap_err();
        assert_eq!(err.to_string(), "sql/scan: unexpected number of columns: 2");

        let mut rows = MemoryRows::new(["a"]);
        let err = scan_one::<i64, _>(&mut rows).unwrap_err();
        assert!(err.is_no_rows());

        let mut rows = MemoryRows::new(["a"]).with_error("broken");
        let err = scan_one::<i64, _>(&mut rows).unwrap_err();
        assert_eq!(err.to_string(), "broken");

        let mut rows = MemoryRows::new(["a"]).add_row([1_i64]).add_row([2_i64]);
        let err = scan_one::<i64, _>(&mut rows).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sql/scan: expect exactly one row in result set"
        );
    }

    #[test]
    fn memory_rows_scan_without_next() {
        let mut rows = MemoryRows::new(["a"]).add_row([1_i64]);
        let mut dest = [SqlValue::Null];
        assert!(rows.scan(&mut dest).is_err());
        assert!(rows.next());
        rows.scan(&mut dest).unwrap();
        assert_eq!(dest[0], SqlValue::I64(1));
        assert!(!rows.next());
    }

    #[test]
    fn normalize_column_names() {
        assert_eq!(normalize_column("COUNT(*)"), "count");
        assert_eq!(normalize_column("Name"), "name");
        assert_eq!(normalize_column("max(age)"), "max");
    }
}
