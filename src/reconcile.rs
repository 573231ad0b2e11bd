use crate::membership::{Member, Membership};

/// Symmetric difference between the main list and the starter pack,
/// keyed by DID. Each side carries the owning collection's members so
/// reports show the handle recorded where the account actually appears.
#[derive(Debug, Clone)]
pub struct Diff {
    pub only_in_main: Vec<Member>,
    pub only_in_pack: Vec<Member>,
}

impl Diff {
    pub fn is_settled(&self) -> bool {
        self.only_in_main.is_empty() && self.only_in_pack.is_empty()
    }
}

/// Compute which members appear in exactly one of the two collections.
/// DID equality only; handles play no part. Pure and deterministic, with
/// each side in its source collection's member order.
pub fn diff(main: &Membership, pack: &Membership) -> Diff {
    let main_dids = main.did_set();
    let pack_dids = pack.did_set();

    let only_in_main = main
        .members
        .iter()
        .filter(|m| !pack_dids.contains(m.did.as_str()))
        .cloned()
        .collect();
    let only_in_pack = pack
        .members
        .iter()
        .filter(|m| !main_dids.contains(m.did.as_str()))
        .cloned()
        .collect();

    Diff {
        only_in_main,
        only_in_pack,
    }
}
