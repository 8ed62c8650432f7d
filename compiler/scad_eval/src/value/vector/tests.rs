use super::*;
use crate::accounting::HeapSizeAccounting;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn nums(values: &[f64]) -> Vec<Value> {
    values.iter().copied().map(Value::Number).collect()
}

fn embedded(values: &[f64]) -> Value {
    let mut builder = VectorBuilder::new(None);
    builder.extend(nums(values));
    Value::EmbeddedVector(builder.build_embedded())
}

#[test]
fn embedding_counts_every_element() {
    let mut builder = VectorBuilder::new(None);
    builder.push(Value::Number(0.0));
    builder.push(embedded(&[1.0, 2.0, 3.0]));
    builder.push(Value::Number(4.0));
    let v = builder.build();

    assert_eq!(v.len(), 5);
    assert!(!v.is_flattened());
    assert_eq!(
        v.iter().cloned().collect::<Vec<_>>(),
        nums(&[0.0, 1.0, 2.0, 3.0, 4.0])
    );
    // Iteration never flattens.
    assert!(!v.is_flattened());
}

#[test]
fn indexing_flattens_once() {
    let mut builder = VectorBuilder::new(None);
    builder.push(embedded(&[1.0, 2.0]));
    builder.push(embedded(&[3.0, 4.0]));
    let v = builder.build();

    assert_eq!(v.get(2), Some(&Value::Number(3.0)));
    assert!(v.is_flattened());
    let first = v.as_slice().as_ptr();
    assert_eq!(v.as_slice().as_ptr(), first);
    assert_eq!(v.len(), 4);
    assert_eq!(v.as_slice().len(), 4);
}

#[test]
fn single_element_embedding_is_inlined() {
    let mut builder = VectorBuilder::new(None);
    builder.push(embedded(&[7.0]));
    let v = builder.build();
    assert_eq!(v.len(), 1);
    assert!(v.is_flattened());
    assert_eq!(v.get(0), Some(&Value::Number(7.0)));
}

#[test]
fn empty_embedding_is_dropped() {
    let mut builder = VectorBuilder::new(None);
    builder.push(embedded(&[]));
    builder.push(Value::Number(1.0));
    let v = builder.build();
    assert_eq!(v.len(), 1);
    assert_eq!(v.iter().count(), 1);
}

#[test]
fn nested_embedding_preserves_order() {
    let mut inner = VectorBuilder::new(None);
    inner.push(embedded(&[1.0, 2.0]));
    inner.push(Value::Number(3.0));
    let inner = Value::EmbeddedVector(inner.build_embedded());

    let mut outer = VectorBuilder::new(None);
    outer.push(Value::Number(0.0));
    outer.push(inner);
    outer.push(embedded(&[4.0, 5.0]));
    let v = outer.build();

    assert_eq!(v.len(), 6);
    assert_eq!(v.as_slice(), nums(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).as_slice());
}

#[test]
fn accounting_tracks_slots_and_flat_copy() {
    let accounting = HeapSizeAccounting::new();
    {
        let mut inner = VectorBuilder::new(Some(accounting.clone()));
        inner.extend(nums(&[1.0, 2.0, 3.0]));
        let inner = Value::EmbeddedVector(inner.build_embedded());
        assert_eq!(accounting.vector_elements(), 3);

        let mut outer = VectorBuilder::new(Some(accounting.clone()));
        outer.push(Value::Number(0.0));
        outer.push(inner);
        let v = outer.build();
        assert_eq!(accounting.vector_elements(), 5);

        let _ = v.as_slice();
        assert_eq!(accounting.vector_elements(), 9);
    }
    assert_eq!(accounting.vector_elements(), 0);
}

#[test]
fn deeply_nested_vector_drops_without_overflow() {
    let mut v = Value::vector([]);
    for i in 0..200_000 {
        v = Value::vector([Value::Number(f64::from(i)), v]);
    }
    drop(v);
}

#[test]
fn shared_storage_between_vector_and_embedded() {
    let v = VectorType::from_values(nums(&[1.0, 2.0]));
    let e = v.clone().into_embedded();
    assert_eq!(e.len(), 2);
    assert!(e.into_vector().ptr_eq(&v));
}

proptest! {
    #[test]
    fn concatenation_equals_naive_append(
        parts in prop::collection::vec(prop::collection::vec(-100i32..100, 0..6), 0..8),
        depth in 1usize..4,
    ) {
        let mut expected = Vec::new();
        let mut builder = VectorBuilder::new(None);
        for part in &parts {
            let values: Vec<Value> = part.iter().map(|&n| Value::Number(f64::from(n))).collect();
            expected.extend(values.iter().cloned());
            // Wrap the part `depth` times to exercise nested embedding.
            let mut wrapped = {
                let mut b = VectorBuilder::new(None);
                b.extend(values);
                b.build_embedded()
            };
            for _ in 1..depth {
                let mut b = VectorBuilder::new(None);
                b.push(Value::EmbeddedVector(wrapped));
                wrapped = b.build_embedded();
            }
            builder.push(Value::EmbeddedVector(wrapped));
        }
        let v = builder.build();
        prop_assert_eq!(v.len(), expected.len());
        prop_assert_eq!(v.iter().cloned().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(v.as_slice().to_vec(), expected.clone());
        // Flattening is idempotent and keeps the count.
        prop_assert_eq!(v.as_slice().len(), v.len());
    }
}
