use rand::Rng;
use spanbox::prelude::*;

fn random_span(rng: &mut impl Rng) -> Span {
    let lower = rng.gen_range(-500..500);
    let width = rng.gen_range(1..50);
    if rng.gen_bool(0.8) {
        Span::int(lower, lower + width).unwrap()
    } else {
        Span::new(
            Scalar::Int(lower),
            Scalar::Int(lower + width),
            rng.gen_bool(0.5),
            rng.gen_bool(0.5),
        )
        .unwrap()
    }
}

fn span_entries(rng: &mut impl Rng, n: usize) -> Vec<IndexEntry<Span>> {
    (0..n)
        .map(|i| IndexEntry::new(random_span(rng), format!("entry_{}", i).into_bytes()))
        .collect()
}

fn tbox_entries(rng: &mut impl Rng, n: usize) -> Vec<IndexEntry<TBox>> {
    (0..n)
        .map(|i| {
            let v = rng.gen_range(-500..500);
            let t = rng.gen_range(0..1_000_000);
            let key = TBox::new(
                Span::int(v, v + rng.gen_range(1..50)).unwrap(),
                Span::timestamp(t, t + rng.gen_range(1..10_000)).unwrap(),
            );
            IndexEntry::new(key, format!("entry_{}", i).into_bytes())
        })
        .collect()
}

fn assert_exact_partition(left: &[usize], right: &[usize], n: usize) {
    let mut seen: Vec<usize> = left.iter().chain(right).copied().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..n).collect::<Vec<_>>());
}

#[test]
fn test_span_split_partition_and_balance() {
    let mut rng = rand::thread_rng();
    let index = SpanRTree::for_spans();
    let limit_ratio = IndexConfig::default().limit_ratio;

    for _ in 0..200 {
        let n = rng.gen_range(2..40);
        let entries = span_entries(&mut rng, n);
        let result = index.pick_split(&entries).unwrap();
        assert_exact_partition(&result.left, &result.right, n);
        assert!(!result.left.is_empty() && !result.right.is_empty());

        if !result.used_fallback {
            let smaller = result.left.len().min(result.right.len()) as f64;
            assert!(
                smaller / n as f64 > limit_ratio,
                "split {}/{} of {} violates the balance floor",
                result.left.len(),
                result.right.len(),
                n
            );
        }
    }
}

#[test]
fn test_span_split_group_keys_cover_members() {
    let mut rng = rand::thread_rng();
    let index = SpanRTree::for_spans();

    for _ in 0..200 {
        let n = rng.gen_range(2..40);
        let entries = span_entries(&mut rng, n);
        let result = index.pick_split(&entries).unwrap();

        for &i in &result.left {
            assert!(result.left_key.contains_span(&entries[i].key));
        }
        for &i in &result.right {
            assert!(result.right_key.contains_span(&entries[i].key));
        }
        // The two group keys together cover exactly the page union.
        let union = index.union(&entries).unwrap();
        assert!(union.contains_span(&result.left_key));
        assert!(union.contains_span(&result.right_key));
    }
}

#[test]
fn test_span_split_identical_entries_fall_back() {
    let index = SpanRTree::for_spans();
    let key = Span::int(5, 9).unwrap();
    let entries: Vec<_> = (0..7)
        .map(|i| IndexEntry::new(key, format!("dup_{}", i).into_bytes()))
        .collect();
    let result = index.pick_split(&entries).unwrap();
    assert!(result.used_fallback);
    assert_exact_partition(&result.left, &result.right, 7);
    assert_eq!(result.left.len(), 4);
    assert_eq!(result.right.len(), 3);
}

#[test]
fn test_span_split_two_entries() {
    let index = SpanRTree::for_spans();
    let entries = vec![
        IndexEntry::new(Span::int(0, 5).unwrap(), &b"a"[..]),
        IndexEntry::new(Span::int(100, 105).unwrap(), &b"b"[..]),
    ];
    let result = index.pick_split(&entries).unwrap();
    assert_eq!(result.left.len(), 1);
    assert_eq!(result.right.len(), 1);
    assert!(!result.used_fallback);
}

#[test]
fn test_span_split_rejects_degenerate_input() {
    let index = SpanRTree::for_spans();
    assert_eq!(
        index.pick_split(&[]),
        Err(IndexError::NotEnoughEntries { got: 0 })
    );
    let one = vec![IndexEntry::new(Span::int(0, 5).unwrap(), &b"a"[..])];
    assert_eq!(
        index.pick_split(&one),
        Err(IndexError::NotEnoughEntries { got: 1 })
    );
}

#[test]
fn test_span_split_rejects_mixed_kinds() {
    let index = SpanRTree::for_spans();
    let entries = vec![
        IndexEntry::new(Span::int(0, 5).unwrap(), &b"a"[..]),
        IndexEntry::new(Span::float(0.0, 5.0).unwrap(), &b"b"[..]),
    ];
    assert!(matches!(
        index.pick_split(&entries),
        Err(IndexError::TypeMismatch { .. })
    ));
}

#[test]
fn test_box_split_partition_and_coverage() {
    let mut rng = rand::thread_rng();
    let index = BoxRTree::<TBox>::new();

    for _ in 0..200 {
        let n = rng.gen_range(2..40);
        let entries = tbox_entries(&mut rng, n);
        let result = index.pick_split(&entries).unwrap();
        assert_exact_partition(&result.left, &result.right, n);
        assert!(!result.left.is_empty() && !result.right.is_empty());

        for &i in &result.left {
            assert!(result.left_key.contains_key(&entries[i].key));
        }
        for &i in &result.right {
            assert!(result.right_key.contains_key(&entries[i].key));
        }
    }
}

#[test]
fn test_box_split_separates_clusters() {
    // Two clusters far apart on the time axis must end up in different
    // groups regardless of the value axis.
    let index = BoxRTree::<TBox>::new();
    let mut entries = Vec::new();
    for i in 0..4 {
        entries.push(IndexEntry::new(
            TBox::new(
                Span::int(0, 10).unwrap(),
                Span::timestamp(i * 10, i * 10 + 100).unwrap(),
            ),
            &b"early"[..],
        ));
    }
    for i in 0..4 {
        entries.push(IndexEntry::new(
            TBox::new(
                Span::int(0, 10).unwrap(),
                Span::timestamp(9_000_000 + i * 10, 9_000_000 + i * 10 + 100).unwrap(),
            ),
            &b"late"[..],
        ));
    }
    let result = index.pick_split(&entries).unwrap();
    assert!(!result.used_fallback);
    let mut left = result.left.clone();
    left.sort_unstable();
    let mut right = result.right.clone();
    right.sort_unstable();
    assert_eq!((left, right), (vec![0, 1, 2, 3], vec![4, 5, 6, 7]));
}

#[test]
fn test_custom_limit_ratio_is_honored() {
    let mut rng = rand::thread_rng();
    let config = IndexConfig::default().with_limit_ratio(0.4);
    let index = SpanRTree::for_spans().with_config(config).unwrap();

    for _ in 0..100 {
        let n = rng.gen_range(5..40);
        let entries = span_entries(&mut rng, n);
        let result = index.pick_split(&entries).unwrap();
        if !result.used_fallback {
            let smaller = result.left.len().min(result.right.len()) as f64;
            assert!(smaller / n as f64 > 0.4);
        }
    }
}
