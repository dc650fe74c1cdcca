//! Laws every parsed DN must satisfy, checked over a spread of real-world shapes.

use adtree_dn::DistinguishedName;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case::empty("", 0)]
#[case::single("DC=au", 1)]
#[case::user("CN=Sam Baxter,OU=Staging,OU=FIM,OU=LH Users,DC=lifehouserpa,DC=org,DC=au", 7)]
#[case::escaped_comma("CN=Baxter\\, Sam,OU=Staging,DC=example,DC=com", 4)]
#[case::hex_escape("CN=line\\0abreak,DC=example", 2)]
#[case::spaced("cn = foo , dc = bar", 2)]
#[case::plus_in_value("CN=a+OU=b,DC=example", 2)]
#[case::trailing_comma("CN=x,DC=y,", 2)]
#[case::unicode("CN=Zoë Ångström,OU=Ünits,DC=example", 3)]
fn laws_hold(#[case] input: &str, #[case] depth: usize) {
    let dn = DistinguishedName::parse(input).unwrap();

    // round trip
    assert_eq!(dn.to_string(), input);

    assert_eq!(dn.depth(), depth);

    let parent = dn.parent();
    assert_eq!(parent.depth(), depth.saturating_sub(1));
    assert_eq!(
        DistinguishedName::parse(parent.as_str()).unwrap().rdns(),
        parent.rdns()
    );

    let hierarchy = dn.parent_hierarchy();
    assert_eq!(hierarchy.len(), depth.saturating_sub(1));
    if let Some(last) = hierarchy.last() {
        assert_eq!(last, &parent);
    }
    for (index, ancestor) in hierarchy.iter().enumerate() {
        assert_eq!(ancestor.depth(), index + 1, "root-most ancestor comes first");
        assert!(ancestor.is_ancestor_of(&dn));
    }
}

#[test]
fn repeated_parent_walks_to_the_root() {
    let mut dn = DistinguishedName::parse("CN=a,OU=b,OU=c,DC=d").unwrap();
    let mut seen = Vec::new();
    while !dn.is_empty() {
        seen.push(dn.rdn());
        dn = dn.parent();
    }
    assert_eq!(seen, vec!["CN=a", "OU=b", "OU=c", "DC=d"]);
}

#[test]
fn hierarchy_sorts_parent_before_child() {
    let users = [
        "CN=Sam,OU=Staging,DC=example,DC=com",
        "CN=Alex,OU=Prod,DC=example,DC=com",
        "OU=Staging,DC=example,DC=com",
    ];

    let mut containers: Vec<DistinguishedName> = users
        .iter()
        .flat_map(|s| DistinguishedName::parse(s).unwrap().parent_hierarchy())
        .collect();
    containers.sort_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.cmp(b)));
    containers.dedup();

    let texts: Vec<&str> = containers.iter().map(DistinguishedName::as_str).collect();
    assert_eq!(
        texts,
        vec![
            "DC=com",
            "DC=example,DC=com",
            "OU=Prod,DC=example,DC=com",
            "OU=Staging,DC=example,DC=com",
        ]
    );
}
