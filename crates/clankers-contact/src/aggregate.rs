//! Wrench aggregation over an ordered set of contacts.
//!
//! A stacked ridge force vector holds each contact's ridge forces back to
//! back, in the order the contacts are iterated. Every function here slices
//! the stacked vector with that same order, so the caller must iterate the
//! collection identically when building and when reading it back.

use clankers_core::Wrench;
use nalgebra::Vector3;

use crate::contact::{Contact, SharedContact};

/// Total number of ridges across `contacts`.
pub fn total_ridge_num(contacts: &[SharedContact]) -> usize {
    contacts.iter().map(|c| c.borrow().ridge_num()).sum()
}

/// Call `f` with each contact and its slice of `ridge_forces`.
///
/// Panics if the slices do not exactly cover `ridge_forces`.
fn for_each_slice<'a, I, F>(contacts: I, ridge_forces: &[f64], mut f: F)
where
    I: IntoIterator<Item = &'a SharedContact>,
    F: FnMut(&Contact, &[f64]),
{
    let mut idx = 0;
    for contact in contacts {
        let contact = contact.borrow();
        let n = contact.ridge_num();
        assert!(
            idx + n <= ridge_forces.len(),
            "ridge force dimension mismatch: need at least {}, got {}",
            idx + n,
            ridge_forces.len()
        );
        f(&contact, &ridge_forces[idx..idx + n]);
        idx += n;
    }
    assert_eq!(
        idx,
        ridge_forces.len(),
        "ridge force dimension mismatch: contacts have {idx} ridges"
    );
}

/// Sum of every contact's wrench about `moment_origin`.
pub fn total_wrench(
    contacts: &[SharedContact],
    ridge_forces: &[f64],
    moment_origin: &Vector3<f64>,
) -> Wrench {
    wrench_list(contacts, ridge_forces, moment_origin)
        .into_iter()
        .sum()
}

/// World-frame wrench of each contact, in contact order.
pub fn wrench_list(
    contacts: &[SharedContact],
    ridge_forces: &[f64],
    moment_origin: &Vector3<f64>,
) -> Vec<Wrench> {
    let mut list = Vec::with_capacity(contacts.len());
    for_each_slice(contacts, ridge_forces, |contact, x| {
        list.push(contact.wrench(x, moment_origin));
    });
    list
}

/// Contact-frame wrench of each contact, in contact order.
pub fn local_wrench_list(contacts: &[SharedContact], ridge_forces: &[f64]) -> Vec<Wrench> {
    let mut list = Vec::with_capacity(contacts.len());
    for_each_slice(contacts, ridge_forces, |contact, x| {
        list.push(contact.local_wrench(x));
    });
    list
}

/// World-frame wrench of each keyed contact.
///
/// `contacts` must be iterated in the order used to stack `ridge_forces`;
/// for a `HashMap` that means the same map instance, unmodified.
pub fn wrench_map<'a, K, I, M>(
    contacts: I,
    ridge_forces: &[f64],
    moment_origin: &Vector3<f64>,
) -> M
where
    K: Clone + 'a,
    I: IntoIterator<Item = (&'a K, &'a SharedContact)>,
    M: FromIterator<(K, Wrench)>,
{
    let (keys, contacts): (Vec<&K>, Vec<&SharedContact>) = contacts.into_iter().unzip();
    let mut wrenches = Vec::with_capacity(keys.len());
    for_each_slice(contacts, ridge_forces, |contact, x| {
        wrenches.push(contact.wrench(x, moment_origin));
    });
    keys.into_iter().cloned().zip(wrenches).collect()
}

/// Contact-frame wrench of each keyed contact.
pub fn local_wrench_map<'a, K, I, M>(contacts: I, ridge_forces: &[f64]) -> M
where
    K: Clone + 'a,
    I: IntoIterator<Item = (&'a K, &'a SharedContact)>,
    M: FromIterator<(K, Wrench)>,
{
    let (keys, contacts): (Vec<&K>, Vec<&SharedContact>) = contacts.into_iter().unzip();
    let mut wrenches = Vec::with_capacity(keys.len());
    for_each_slice(contacts, ridge_forces, |contact, x| {
        wrenches.push(contact.local_wrench(x));
    });
    keys.into_iter().cloned().zip(wrenches).collect()
}

/// Flatten keyed contacts into a vector, in the collection's iteration order.
pub fn contacts_from_map<'a, K, I>(contacts: I) -> Vec<SharedContact>
where
    K: 'a,
    I: IntoIterator<Item = (&'a K, &'a SharedContact)>,
{
    contacts.into_iter().map(|(_, c)| c.clone()).collect()
}
