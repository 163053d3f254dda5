use std::rc::Rc;

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::{
    ast::{FunctionDecl, FunctionKind},
    environment::EnvId,
    value::Value,
};

/// Index of an object in the arena heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HeapId(u32);

impl HeapId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A user function value: a declaration plus the environment it captured.
///
/// Method lookup produces a *bound* copy whose closure is a fresh one-slot
/// frame holding the receiver (see `Interp::bind_method`); initializers read
/// `this` back out of that slot when they return.
#[derive(Debug)]
pub(crate) struct LoxFunction {
    pub name: Option<Rc<str>>,
    pub decl: Rc<FunctionDecl>,
    pub closure: Option<EnvId>,
    pub kind: FunctionKind,
}

/// A class object. Also reachable as a callable (constructing instances) and
/// as a property target (static methods live on the synthesized metaclass).
#[derive(Debug)]
pub(crate) struct LoxClass {
    pub name: Rc<str>,
    pub superclass: Option<HeapId>,
    /// Method table in declaration order.
    pub methods: IndexMap<Rc<str>, HeapId>,
    /// The metaclass holding this class's static methods. `None` only for
    /// metaclasses themselves.
    pub metaclass: Option<HeapId>,
}

#[derive(Debug)]
pub(crate) struct LoxInstance {
    pub class: HeapId,
    pub fields: AHashMap<Rc<str>, Value>,
}

#[derive(Debug)]
pub(crate) struct LoxArray {
    pub elements: Vec<Value>,
}

#[derive(Debug)]
pub(crate) enum HeapData {
    Function(LoxFunction),
    Class(LoxClass),
    Instance(LoxInstance),
    Array(LoxArray),
}

/// Arena storage for every runtime object with identity.
///
/// Objects are never freed individually; the whole arena drops with the run
/// or REPL session that owns it. That makes the cycles between closures,
/// classes, and environments harmless: nothing is reference counted, so
/// nothing leaks per-object bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct Heap {
    slots: Vec<HeapData>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, data: HeapData) -> HeapId {
        let id = HeapId(u32::try_from(self.slots.len()).expect("heap exceeds u32 ids"));
        self.slots.push(data);
        id
    }

    pub fn get(&self, id: HeapId) -> &HeapData {
        &self.slots[id.index()]
    }

    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        &mut self.slots[id.index()]
    }

    /// The function at `id`. The caller guarantees the id came from a
    /// function allocation.
    pub fn function(&self, id: HeapId) -> &LoxFunction {
        match self.get(id) {
            HeapData::Function(f) => f,
            _ => unreachable!("heap id does not refer to a function"),
        }
    }

    /// The class at `id`. The caller guarantees the id came from a class
    /// allocation.
    pub fn class(&self, id: HeapId) -> &LoxClass {
        match self.get(id) {
            HeapData::Class(c) => c,
            _ => unreachable!("heap id does not refer to a class"),
        }
    }

    /// Walks the inheritance chain looking for a method: this class's table
    /// first, then the superclass, transitively.
    pub fn find_method(&self, class: HeapId, name: &str) -> Option<HeapId> {
        let class = self.class(class);
        if let Some(method) = class.methods.get(name) {
            return Some(*method);
        }
        class.superclass.and_then(|superclass| self.find_method(superclass, name))
    }
}
