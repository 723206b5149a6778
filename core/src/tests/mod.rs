//! Multi-component scenarios (`spec.md` §8 "Concrete scenarios"): each one
//! drives [`crate::congruence::Congruence`] end to end, exercising whichever
//! mix of Froidure-Pin, Todd-Coxeter and Knuth-Bendix the dispatcher picks.
//! Scenario 6 (Knuth-Bendix alone, no congruence involved) lives as a
//! component-level unit test in `rewriting::system`, since it never touches
//! the dispatcher.

use crate::congruence::{Congruence, CongruenceKind, Presentation};
use crate::element::Transformation;
use crate::froidure_pin::FroidurePin;
use crate::word::Relation;

fn rel(lhs: &[u32], rhs: &[u32]) -> Relation {
    Relation::new(lhs.to_vec(), rhs.to_vec())
}

#[test]
fn scenario_1_small_two_sided_fp_semigroup() {
    let relations = vec![rel(&[0, 0, 0], &[0]), rel(&[0], &[1, 1])];
    let presentation = Presentation::new(2, relations);
    let mut c = Congruence::from_presentation(CongruenceKind::TwoSided, presentation, Vec::new()).unwrap();
    assert_eq!(c.nr_classes(), 5);
    assert!(c.equal(&vec![0, 0, 1], &vec![0, 0, 0, 0, 1]));
    assert!(c.equal(&vec![0, 0, 0, 0, 1], &vec![0, 1, 1, 0, 0, 1]));
    assert!(!c.equal(&vec![0, 0, 0], &vec![0, 0, 1]));
    assert!(!c.equal(&vec![1], &vec![0, 0, 0]));
}

#[test]
fn scenario_2_right_congruence_on_transformation_semigroup() {
    // Each bracketed image vector names an element of the 88-element
    // semigroup generated by `t1`, `t2`; words are obtained via
    // `factorisation`, exactly as the extra generating pair is built from
    // `t1'`, `t2'`.
    let t1 = Transformation::new(vec![1, 3, 4, 2, 3]);
    let t2 = Transformation::new(vec![3, 2, 1, 3, 3]);
    let mut fp = FroidurePin::new(vec![t1, t2]).unwrap();
    assert_eq!(fp.size(), 88);

    let word_of = |fp: &mut FroidurePin<Transformation>, image: Vec<u32>| {
        fp.factorisation(&Transformation::new(image)).expect("element belongs to the semigroup")
    };

    let t1p = word_of(&mut fp, vec![3, 4, 4, 4, 4]);
    let t2p = word_of(&mut fp, vec![3, 1, 3, 3, 3]);

    let a1 = word_of(&mut fp, vec![1, 3, 3, 3, 3]);
    let a2 = word_of(&mut fp, vec![4, 2, 4, 4, 2]);
    let b1 = word_of(&mut fp, vec![2, 3, 2, 2, 2]);
    let b2 = word_of(&mut fp, vec![2, 3, 3, 3, 3]);

    let mut c = Congruence::from_semigroup(CongruenceKind::Right, fp, vec![Relation::new(t1p, t2p)]).unwrap();
    assert_eq!(c.nr_classes(), 72);
    assert!(!c.equal(&a1, &a2));
    assert!(c.equal(&b1, &b2));
}

#[test]
fn scenario_3_obviously_infinite_presentation_omits_tc() {
    let relations = vec![rel(&[0, 1], &[0])];
    let extra = vec![rel(&[2, 2], &[2])];
    let presentation = Presentation::new(3, relations);
    let c = Congruence::from_presentation(CongruenceKind::TwoSided, presentation, extra).unwrap();
    assert!(c.is_obviously_infinite());
}

#[test]
fn scenario_4_dihedral_group_of_order_six_kbfp() {
    let relations = vec![
        rel(&[0, 0], &[0]),
        rel(&[0, 1], &[1]),
        rel(&[1, 0], &[1]),
        rel(&[0, 2], &[2]),
        rel(&[2, 0], &[2]),
        rel(&[0, 3], &[3]),
        rel(&[3, 0], &[3]),
        rel(&[0, 4], &[4]),
        rel(&[4, 0], &[4]),
        rel(&[1, 2], &[0]),
        rel(&[2, 1], &[0]),
        rel(&[3, 4], &[0]),
        rel(&[4, 3], &[0]),
        rel(&[2, 2], &[0]),
        rel(&[1, 4, 2, 3, 3], &[0]),
        rel(&[4, 4, 4], &[0]),
    ];
    let presentation = Presentation::new(5, relations);
    let mut c = Congruence::from_presentation(CongruenceKind::TwoSided, presentation, Vec::new()).unwrap();
    c.force_kbfp();
    assert_eq!(c.nr_classes(), 6);
    assert_eq!(c.word_to_class_index(&vec![1]), c.word_to_class_index(&vec![2]));
}

#[test]
fn scenario_5_bicyclic_monoid_two_sided() {
    let relations = vec![
        rel(&[0, 1], &[1]),
        rel(&[1, 0], &[1]),
        rel(&[0, 0], &[0]),
        rel(&[0, 2], &[2]),
        rel(&[2, 0], &[2]),
        rel(&[1, 2], &[0]),
    ];
    let presentation = Presentation::new(3, relations);
    let mut c = Congruence::from_presentation(CongruenceKind::TwoSided, presentation, Vec::new()).unwrap();
    let a = c.word_to_class_index(&vec![0]);
    let b = c.word_to_class_index(&vec![1, 2, 1, 1, 2, 2]);
    let d = c.word_to_class_index(&vec![1, 0, 2, 0, 1, 2]);
    assert_eq!(a, b);
    assert_eq!(b, d);
    assert!(c.equal(&vec![2, 1], &vec![1, 2, 0, 2, 1, 1, 2]));
}
