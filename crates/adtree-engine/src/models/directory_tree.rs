use std::collections::BTreeMap;

use adtree_dn::DistinguishedName;

use crate::models::LdifRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryNode {
    pub dn: DistinguishedName,
    /// The leaf `type=value`, e.g. `OU=Staging`.
    pub name: String,
    /// Record DNs naming this entry. Usually one; several when an export
    /// spells the same segments differently (`OU=x,DC=y` and `OU=x, DC=y`).
    /// Empty for containers that only appear as ancestors of other entries.
    pub records: Vec<DistinguishedName>,
    pub is_expanded: bool,
    /// Keyed by the escaped leaf segment, which is unique among siblings.
    pub children: BTreeMap<String, DirectoryNode>,
}

impl DirectoryNode {
    pub fn new(dn: DistinguishedName) -> Self {
        Self {
            name: dn.rdn(),
            dn,
            records: Vec::new(),
            is_expanded: false,
            children: BTreeMap::new(),
        }
    }

    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn has_record(&self) -> bool {
        !self.records.is_empty()
    }

    fn is_named_by(&self, dn: &DistinguishedName) -> bool {
        self.dn == *dn || self.records.contains(dn)
    }

    /// Places `dn` below this node, synthesizing any missing ancestors.
    ///
    /// `chain` holds the DN and its ancestors, root-most first.
    fn insert(&mut self, chain: &[DistinguishedName]) -> &mut DirectoryNode {
        let Some((next, rest)) = chain.split_first() else {
            return self;
        };

        let key = next.rdns()[0].to_escaped_string();
        self.children
            .entry(key)
            .or_insert_with(|| DirectoryNode::new(next.clone()))
            .insert(rest)
    }

    fn find(&self, dn: &DistinguishedName) -> Option<&DirectoryNode> {
        if self.is_named_by(dn) {
            return Some(self);
        }
        self.children.values().find_map(|child| child.find(dn))
    }

    fn find_mut(&mut self, dn: &DistinguishedName) -> Option<&mut DirectoryNode> {
        if self.is_named_by(dn) {
            return Some(self);
        }
        self.children
            .values_mut()
            .find_map(|child| child.find_mut(dn))
    }

    fn count(&self) -> usize {
        1 + self.children.values().map(DirectoryNode::count).sum::<usize>()
    }

    fn collect_dns<'a>(&'a self, out: &mut Vec<&'a DistinguishedName>) {
        for child in self.children.values() {
            if child.has_record() {
                out.extend(&child.records);
            } else {
                out.push(&child.dn);
            }
            child.collect_dns(out);
        }
    }

    pub fn get_flattened_items(&self, depth: usize) -> Vec<DirectoryTreeItem> {
        let mut items = vec![DirectoryTreeItem {
            node: self.clone(),
            depth,
        }];

        if self.is_expanded {
            // Containers first, then leaf entries, both case-insensitively by name
            let mut sorted_children: Vec<_> = self.children.values().collect();
            sorted_children.sort_by(|a, b| {
                b.is_container()
                    .cmp(&a.is_container())
                    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            });

            for child in sorted_children {
                items.extend(child.get_flattened_items(depth + 1));
            }
        }

        items
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryTreeItem {
    pub node: DirectoryNode,
    pub depth: usize,
}

/// The container hierarchy of a set of directory entries.
///
/// The root is a synthetic node (empty DN) labelled after the source, with
/// the root-most naming contexts such as `DC=com` as its children.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryTree {
    pub root: DirectoryNode,
}

impl DirectoryTree {
    pub fn new(label: impl Into<String>) -> Self {
        let mut root = DirectoryNode::new(DistinguishedName::default());
        root.name = label.into();
        root.is_expanded = true;
        Self { root }
    }

    pub fn build_from_records(label: impl Into<String>, records: &[LdifRecord]) -> Self {
        let mut tree = Self::new(label);
        for record in records {
            tree.insert(record.dn());
        }
        log::debug!(
            "Built directory tree with {} nodes from {} records",
            tree.len(),
            records.len()
        );
        tree
    }

    /// Adds an entry. Re-inserting an identical DN is a no-op; a DN with the
    /// same segments but different text joins the existing node.
    pub fn insert(&mut self, dn: &DistinguishedName) {
        if dn.is_empty() {
            log::warn!("Ignoring entry with an empty DN");
            return;
        }

        let mut chain = dn.parent_hierarchy();
        chain.push(dn.clone());

        let node = self.root.insert(&chain);
        if node.records.contains(dn) {
            return;
        }
        match node.records.first() {
            Some(first) => log::warn!("Record '{dn}' names the same entry as '{first}'"),
            None => node.dn = dn.clone(),
        }
        node.records.push(dn.clone());
    }

    pub fn find(&self, dn: &DistinguishedName) -> Option<&DirectoryNode> {
        self.root.find(dn)
    }

    /// Number of nodes, not counting the synthetic root.
    pub fn len(&self) -> usize {
        self.root.count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Every DN in the tree ordered so each parent precedes its children:
    /// by depth, then ordinally by DN text.
    pub fn creation_order(&self) -> Vec<DistinguishedName> {
        let mut dns = Vec::with_capacity(self.len());
        self.root.collect_dns(&mut dns);
        dns.sort_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.cmp(b)));
        dns.into_iter().cloned().collect()
    }

    pub fn toggle(&mut self, dn: &DistinguishedName) {
        if let Some(node) = self.root.find_mut(dn) {
            node.is_expanded = !node.is_expanded;
        }
    }

    pub fn expand(&mut self, dn: &DistinguishedName) {
        if let Some(node) = self.root.find_mut(dn) {
            node.is_expanded = true;
        }
    }

    pub fn collapse(&mut self, dn: &DistinguishedName) {
        if let Some(node) = self.root.find_mut(dn) {
            node.is_expanded = false;
        }
    }

    pub fn get_items(&self) -> Vec<DirectoryTreeItem> {
        self.root.get_flattened_items(0)
    }
}
