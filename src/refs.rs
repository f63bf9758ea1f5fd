use pdf_writer::Ref;
use std::collections::HashMap;

/// Every kind of indirect object the document writer emits. Indexed variants
/// carry the arena / page index of the thing they belong to.
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub enum RefType {
    Catalog,
    Info,
    PageTree,
    Page(usize),
    ContentForPage(usize),
    Font(usize),
    CidFont(usize),
    ToUnicode(usize),
    FontDescriptor(usize),
    FontData(usize),
    Image(usize),
    ImageMask(usize),
}

/// Hands out object ids in allocation order and remembers which id went to
/// which object, so later objects can point back at earlier ones
#[derive(Debug)]
pub struct ObjectReferences {
    refs: HashMap<RefType, Ref>,
    next_id: i32,
}

impl Default for ObjectReferences {
    fn default() -> Self {
        ObjectReferences::new()
    }
}

impl ObjectReferences {
    pub fn new() -> ObjectReferences {
        ObjectReferences {
            refs: HashMap::new(),
            next_id: 1,
        }
    }

    /// The id previously allocated for `ref_type`, if any
    pub fn get(&self, ref_type: RefType) -> Option<Ref> {
        self.refs.get(&ref_type).copied()
    }

    /// The id for `ref_type`, allocating one the first time it is asked for
    pub fn alloc(&mut self, ref_type: RefType) -> Ref {
        if let Some(id) = self.get(ref_type) {
            return id;
        }
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        self.refs.insert(ref_type, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_is_stable_per_object() {
        let mut refs = ObjectReferences::new();
        let catalog = refs.alloc(RefType::Catalog);
        let page = refs.alloc(RefType::Page(0));
        assert_ne!(catalog, page);
        assert_eq!(refs.alloc(RefType::Page(0)), page);
        assert_eq!(refs.get(RefType::Catalog), Some(catalog));
        assert_eq!(refs.get(RefType::Page(1)), None);
        assert_eq!(refs.alloc(RefType::Info), Ref::new(3));
    }
}
