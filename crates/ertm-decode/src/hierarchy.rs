//! Parent/child resolution for scene objects.

use crate::records::scene::SceneObject;

/// Arrange a flat object list into trees by `group` name and return the roots.
///
/// Each object is attached to the first object whose name equals its group.
/// Objects whose group matches nothing (or themselves) stay roots. A parent
/// cycle is cut at its first object in input order, which becomes a root.
/// Root and sibling order follow the input.
#[must_use]
pub fn build(objects: Vec<SceneObject>) -> Vec<SceneObject> {
    let mut parents: Vec<Option<usize>> = objects
        .iter()
        .enumerate()
        .map(|(i, object)| {
            let group = object.group.as_deref()?;
            objects
                .iter()
                .position(|candidate| candidate.name == group)
                .filter(|&p| p != i)
        })
        .collect();

    for i in 0..parents.len() {
        if reaches(&parents, i) {
            tracing::debug!("group cycle through {:?}, treating it as a root", objects[i].name);
            parents[i] = None;
        }
    }

    let mut children = vec![Vec::new(); objects.len()];
    let mut roots = Vec::new();
    for (i, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let mut slots: Vec<Option<SceneObject>> = objects.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|root| attach(root, &children, &mut slots))
        .collect()
}

/// Whether following parents from `start` leads back to it.
fn reaches(parents: &[Option<usize>], start: usize) -> bool {
    let mut current = parents[start];
    for _ in 0..parents.len() {
        match current {
            Some(p) if p == start => return true,
            Some(p) => current = parents[p],
            None => return false,
        }
    }
    false
}

fn attach(
    index: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<SceneObject>],
) -> Option<SceneObject> {
    let mut object = slots[index].take()?;
    for &child in &children[index] {
        if let Some(child) = attach(child, children, slots) {
            object.children.push(child);
        }
    }
    Some(object)
}
