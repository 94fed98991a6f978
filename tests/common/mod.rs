//! Scriptable in-memory debug host used by the integration tests
//!
//! `FakeDebugger` implements the full introspection boundary over an
//! arena of scripted type and value definitions: tests lay out a
//! value graph, a heap, and threads/frames/scopes, then run the
//! analyzer against it.
#![allow(dead_code)]

use heapscope::core::types::{
    Address, Field, HeapBlock, InspectError, InspectResult, ThreadId, TypeKind,
};
use heapscope::host::{
    GlobalVariable, HeapInspect, StackInspect, SymbolInspect, TypeInspect, ValueInspect,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

pub type TypeId = usize;
pub type ValueId = usize;

#[derive(Debug, Clone)]
enum TypeDef {
    Primitive {
        name: String,
        size: usize,
    },
    Pointer {
        target: TypeId,
    },
    Reference {
        target: TypeId,
    },
    Array {
        elem: TypeId,
        len: usize,
    },
    Struct {
        name: String,
        size: usize,
        fields: Vec<Field<TypeId>>,
    },
    Union {
        name: String,
        size: usize,
        fields: Vec<Field<TypeId>>,
    },
    Typedef {
        name: String,
        target: TypeId,
    },
}

#[derive(Debug, Clone)]
struct ValueDef {
    ty: TypeId,
    addr: Option<usize>,
    accessible: bool,
    /// Pointee address stored in a pointer-typed value
    pointer_to: Option<usize>,
    /// Value designated by the pointer
    deref: Option<ValueId>,
    elements: Vec<ValueId>,
    members: HashMap<String, ValueId>,
    dynamic: Option<TypeId>,
    /// Reinterpretations: base-class subobjects, dynamic-type casts
    casts: HashMap<TypeId, ValueId>,
}

impl ValueDef {
    fn new(ty: TypeId, addr: Option<usize>) -> Self {
        ValueDef {
            ty,
            addr,
            accessible: true,
            pointer_to: None,
            deref: None,
            elements: Vec::new(),
            members: HashMap::new(),
            dynamic: None,
            casts: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeScope {
    pub is_static: bool,
    pub vars: Vec<(String, ValueId)>,
}

#[derive(Debug, Clone)]
pub struct FakeFrame {
    pub name: String,
    /// Innermost first; each scope's parent is the next entry
    pub scopes: Vec<FakeScope>,
}

#[derive(Debug, Clone)]
pub struct FakeThread {
    pub id: ThreadId,
    /// Newest first
    pub frames: Vec<FakeFrame>,
}

#[derive(Default)]
pub struct FakeDebugger {
    types: Vec<TypeDef>,
    values: Vec<ValueDef>,
    heap: Vec<HeapBlock>,
    threads: Vec<FakeThread>,
    globals: Vec<(String, Option<String>, ValueId)>,
    expr_symbols: HashMap<String, ValueId>,
    global_symbols: HashMap<String, ValueId>,
    eval_errors: HashSet<String>,
    oracle_failures: HashSet<usize>,
    broken_threads: HashSet<ThreadId>,
    unselectable_threads: HashSet<ThreadId>,
    selected: Cell<Option<ThreadId>>,
    /// Every successful select_thread call, in order
    pub selections: RefCell<Vec<ThreadId>>,
}

impl FakeDebugger {
    pub fn new() -> Self {
        FakeDebugger::default()
    }

    // --- type builders ---

    pub fn primitive(&mut self, name: &str, size: usize) -> TypeId {
        self.push_type(TypeDef::Primitive {
            name: name.to_string(),
            size,
        })
    }

    pub fn pointer_to(&mut self, target: TypeId) -> TypeId {
        self.push_type(TypeDef::Pointer { target })
    }

    pub fn reference_to(&mut self, target: TypeId) -> TypeId {
        self.push_type(TypeDef::Reference { target })
    }

    pub fn array_of(&mut self, elem: TypeId, len: usize) -> TypeId {
        self.push_type(TypeDef::Array { elem, len })
    }

    pub fn struct_type(&mut self, name: &str, size: usize, fields: Vec<Field<TypeId>>) -> TypeId {
        self.push_type(TypeDef::Struct {
            name: name.to_string(),
            size,
            fields,
        })
    }

    pub fn union_type(&mut self, name: &str, size: usize, fields: Vec<Field<TypeId>>) -> TypeId {
        self.push_type(TypeDef::Union {
            name: name.to_string(),
            size,
            fields,
        })
    }

    pub fn typedef_of(&mut self, name: &str, target: TypeId) -> TypeId {
        self.push_type(TypeDef::Typedef {
            name: name.to_string(),
            target,
        })
    }

    fn push_type(&mut self, def: TypeDef) -> TypeId {
        self.types.push(def);
        self.types.len() - 1
    }

    // --- heap scripting ---

    pub fn add_block(&mut self, base: usize, size: usize, in_use: bool) {
        let block = if in_use {
            HeapBlock::in_use(Address::new(base), size)
        } else {
            HeapBlock::free(Address::new(base), size)
        };
        self.heap.push(block);
    }

    /// Makes the oracle error when queried at exactly this address
    pub fn fail_block_at(&mut self, addr: usize) {
        self.oracle_failures.insert(addr);
    }

    // --- value builders ---

    pub fn scalar(&mut self, ty: TypeId, addr: Option<usize>) -> ValueId {
        self.push_value(ValueDef::new(ty, addr))
    }

    pub fn optimized_out(&mut self, ty: TypeId) -> ValueId {
        let mut def = ValueDef::new(ty, None);
        def.accessible = false;
        self.push_value(def)
    }

    pub fn pointer(&mut self, ty: TypeId, addr: Option<usize>, to: usize) -> ValueId {
        let mut def = ValueDef::new(ty, addr);
        def.pointer_to = Some(to);
        self.push_value(def)
    }

    pub fn aggregate(&mut self, ty: TypeId, addr: Option<usize>) -> ValueId {
        self.push_value(ValueDef::new(ty, addr))
    }

    fn push_value(&mut self, def: ValueDef) -> ValueId {
        self.values.push(def);
        self.values.len() - 1
    }

    pub fn link_deref(&mut self, ptr: ValueId, pointee: ValueId) {
        self.values[ptr].deref = Some(pointee);
    }

    pub fn set_member(&mut self, value: ValueId, name: &str, member: ValueId) {
        self.values[value].members.insert(name.to_string(), member);
    }

    pub fn set_elements(&mut self, value: ValueId, elements: Vec<ValueId>) {
        self.values[value].elements = elements;
    }

    pub fn set_cast(&mut self, value: ValueId, ty: TypeId, result: ValueId) {
        self.values[value].casts.insert(ty, result);
    }

    /// Marks a pointer as polymorphic: its runtime type differs from
    /// the static one, and casting re-reads it as `cast_result`
    pub fn set_dynamic(&mut self, value: ValueId, ty: TypeId, cast_result: ValueId) {
        self.values[value].dynamic = Some(ty);
        self.values[value].casts.insert(ty, cast_result);
    }

    // --- process scripting ---

    pub fn add_thread(&mut self, id: ThreadId) -> usize {
        self.threads.push(FakeThread {
            id,
            frames: Vec::new(),
        });
        self.threads.len() - 1
    }

    pub fn add_frame(&mut self, thread: usize, name: &str) -> usize {
        self.threads[thread].frames.push(FakeFrame {
            name: name.to_string(),
            scopes: Vec::new(),
        });
        self.threads[thread].frames.len() - 1
    }

    pub fn add_scope(&mut self, thread: usize, frame: usize, is_static: bool) -> usize {
        self.threads[thread].frames[frame].scopes.push(FakeScope {
            is_static,
            vars: Vec::new(),
        });
        self.threads[thread].frames[frame].scopes.len() - 1
    }

    pub fn add_local(
        &mut self,
        thread: usize,
        frame: usize,
        scope: usize,
        name: &str,
        value: ValueId,
    ) {
        self.threads[thread].frames[frame].scopes[scope]
            .vars
            .push((name.to_string(), value));
    }

    pub fn add_global(&mut self, name: &str, file: Option<&str>, value: ValueId) {
        self.globals
            .push((name.to_string(), file.map(str::to_string), value));
    }

    pub fn add_expr_symbol(&mut self, name: &str, value: ValueId) {
        self.expr_symbols.insert(name.to_string(), value);
    }

    pub fn add_global_symbol(&mut self, name: &str, value: ValueId) {
        self.global_symbols.insert(name.to_string(), value);
    }

    pub fn fail_eval(&mut self, expr: &str) {
        self.eval_errors.insert(expr.to_string());
    }

    /// Makes newest_frame error for the thread
    pub fn break_thread(&mut self, id: ThreadId) {
        self.broken_threads.insert(id);
    }

    /// Makes select_thread error for the thread
    pub fn refuse_thread(&mut self, id: ThreadId) {
        self.unselectable_threads.insert(id);
    }

    /// Sets the initially selected thread
    pub fn select(&self, id: ThreadId) {
        self.selected.set(Some(id));
    }

    pub fn currently_selected(&self) -> Option<ThreadId> {
        self.selected.get()
    }

    fn selected_index(&self) -> Option<usize> {
        let id = self.selected.get()?;
        self.threads.iter().position(|t| t.id == id)
    }
}

impl TypeInspect for FakeDebugger {
    type TypeRef = TypeId;

    fn type_kind(&self, ty: &TypeId) -> TypeKind {
        match &self.types[*ty] {
            TypeDef::Primitive { .. } => TypeKind::Primitive,
            TypeDef::Pointer { .. } => TypeKind::Pointer,
            TypeDef::Reference { .. } => TypeKind::Reference,
            TypeDef::Array { .. } => TypeKind::Array,
            TypeDef::Struct { .. } => TypeKind::Struct,
            TypeDef::Union { .. } => TypeKind::Union,
            TypeDef::Typedef { .. } => TypeKind::Typedef,
        }
    }

    fn type_size(&self, ty: &TypeId) -> usize {
        match &self.types[*ty] {
            TypeDef::Primitive { size, .. } => *size,
            TypeDef::Pointer { .. } => 8,
            TypeDef::Reference { .. } => 8,
            TypeDef::Array { elem, len } => self.type_size(elem) * len,
            TypeDef::Struct { size, .. } => *size,
            TypeDef::Union { size, .. } => *size,
            TypeDef::Typedef { target, .. } => self.type_size(target),
        }
    }

    fn type_name(&self, ty: &TypeId) -> Option<String> {
        match &self.types[*ty] {
            TypeDef::Primitive { name, .. } => Some(name.clone()),
            TypeDef::Pointer { target } => self.type_name(target).map(|n| format!("{} *", n)),
            TypeDef::Reference { target } => self.type_name(target).map(|n| format!("{} &", n)),
            TypeDef::Array { elem, len } => self.type_name(elem).map(|n| format!("{}[{}]", n, len)),
            TypeDef::Struct { name, .. } => Some(format!("struct {}", name)),
            TypeDef::Union { name, .. } => Some(format!("union {}", name)),
            TypeDef::Typedef { name, .. } => Some(name.clone()),
        }
    }

    fn basic_type(&self, ty: &TypeId) -> TypeId {
        match &self.types[*ty] {
            TypeDef::Typedef { target, .. } => self.basic_type(target),
            TypeDef::Reference { target } => self.basic_type(target),
            _ => *ty,
        }
    }

    fn target_type(&self, ty: &TypeId) -> Option<TypeId> {
        match &self.types[*ty] {
            TypeDef::Pointer { target } => Some(*target),
            TypeDef::Reference { target } => Some(*target),
            TypeDef::Array { elem, .. } => Some(*elem),
            _ => None,
        }
    }

    fn fields(&self, ty: &TypeId) -> Vec<Field<TypeId>> {
        match &self.types[*ty] {
            TypeDef::Struct { fields, .. } => fields.clone(),
            TypeDef::Union { fields, .. } => fields.clone(),
            _ => Vec::new(),
        }
    }
}

impl ValueInspect for FakeDebugger {
    type ValueRef = ValueId;

    fn value_type(&self, value: &ValueId) -> TypeId {
        self.values[*value].ty
    }

    fn address_of(&self, value: &ValueId) -> Option<Address> {
        self.values[*value].addr.map(Address::new)
    }

    fn is_accessible(&self, value: &ValueId) -> bool {
        self.values[*value].accessible
    }

    fn dynamic_type(&self, value: &ValueId) -> Option<TypeId> {
        self.values[*value].dynamic
    }

    fn cast(&self, value: &ValueId, ty: &TypeId) -> Option<ValueId> {
        self.values[*value].casts.get(ty).copied()
    }

    fn dereference(&self, value: &ValueId) -> Option<ValueId> {
        self.values[*value].deref
    }

    fn element_at(&self, value: &ValueId, index: usize) -> Option<ValueId> {
        self.values[*value].elements.get(index).copied()
    }

    fn field_value(&self, value: &ValueId, field: &Field<TypeId>) -> Option<ValueId> {
        self.values[*value].members.get(&field.name).copied()
    }

    fn pointer_address(&self, value: &ValueId) -> Option<Address> {
        self.values[*value].pointer_to.map(Address::new)
    }
}

impl HeapInspect for FakeDebugger {
    fn block_at(&self, address: Address) -> InspectResult<Option<HeapBlock>> {
        if self.oracle_failures.contains(&address.as_usize()) {
            return Err(InspectError::allocator_query(address, "scripted failure"));
        }
        Ok(self.heap.iter().find(|b| b.contains(address)).copied())
    }

    fn next_block(&self, after: Option<Address>) -> InspectResult<Option<HeapBlock>> {
        let floor = after.map(|a| a.as_usize());
        let mut next: Option<HeapBlock> = None;
        for block in &self.heap {
            if let Some(floor) = floor {
                if block.base.as_usize() <= floor {
                    continue;
                }
            }
            if next.map_or(true, |n| block.base < n.base) {
                next = Some(*block);
            }
        }
        Ok(next)
    }
}

impl StackInspect for FakeDebugger {
    type FrameRef = (usize, usize);
    type ScopeRef = (usize, usize, usize);

    fn thread_ids(&self) -> InspectResult<Vec<ThreadId>> {
        Ok(self.threads.iter().map(|t| t.id).collect())
    }

    fn selected_thread(&self) -> InspectResult<Option<ThreadId>> {
        Ok(self.selected.get())
    }

    fn select_thread(&self, thread: ThreadId) -> InspectResult<()> {
        if self.unselectable_threads.contains(&thread) {
            return Err(InspectError::thread_select(thread, "scripted failure"));
        }
        if !self.threads.iter().any(|t| t.id == thread) {
            return Err(InspectError::thread_select(thread, "no such thread"));
        }
        self.selected.set(Some(thread));
        self.selections.borrow_mut().push(thread);
        Ok(())
    }

    fn newest_frame(&self) -> InspectResult<Option<(usize, usize)>> {
        let Some(thread) = self.selected.get() else {
            return Ok(None);
        };
        if self.broken_threads.contains(&thread) {
            return Err(InspectError::introspection("no frame information"));
        }
        let Some(index) = self.selected_index() else {
            return Ok(None);
        };
        if self.threads[index].frames.is_empty() {
            Ok(None)
        } else {
            Ok(Some((index, 0)))
        }
    }

    fn older_frame(&self, frame: &(usize, usize)) -> Option<(usize, usize)> {
        let (thread, depth) = *frame;
        if depth + 1 < self.threads[thread].frames.len() {
            Some((thread, depth + 1))
        } else {
            None
        }
    }

    fn frame_name(&self, frame: &(usize, usize)) -> Option<String> {
        let (thread, depth) = *frame;
        Some(self.threads[thread].frames[depth].name.clone())
    }

    fn frame_scope(&self, frame: &(usize, usize)) -> Option<(usize, usize, usize)> {
        let (thread, depth) = *frame;
        if self.threads[thread].frames[depth].scopes.is_empty() {
            None
        } else {
            Some((thread, depth, 0))
        }
    }

    fn parent_scope(&self, scope: &(usize, usize, usize)) -> Option<(usize, usize, usize)> {
        let (thread, depth, index) = *scope;
        if index + 1 < self.threads[thread].frames[depth].scopes.len() {
            Some((thread, depth, index + 1))
        } else {
            None
        }
    }

    fn is_static_scope(&self, scope: &(usize, usize, usize)) -> bool {
        let (thread, depth, index) = *scope;
        self.threads[thread].frames[depth].scopes[index].is_static
    }

    fn scope_variables(
        &self,
        scope: &(usize, usize, usize),
        _frame: &(usize, usize),
    ) -> Vec<(String, ValueId)> {
        let (thread, depth, index) = *scope;
        self.threads[thread].frames[depth].scopes[index].vars.clone()
    }
}

impl SymbolInspect for FakeDebugger {
    fn evaluate(&self, expr: &str) -> InspectResult<Option<ValueId>> {
        if self.eval_errors.contains(expr) {
            return Err(InspectError::eval_failed(expr, "scripted failure"));
        }
        Ok(self.expr_symbols.get(expr).copied())
    }

    fn lookup_global(&self, name: &str) -> InspectResult<Option<ValueId>> {
        Ok(self.global_symbols.get(name).copied())
    }

    fn global_variables(&self) -> InspectResult<Vec<GlobalVariable<ValueId>>> {
        Ok(self
            .globals
            .iter()
            .map(|(name, file, value)| GlobalVariable {
                name: name.clone(),
                source_file: file.clone(),
                value: *value,
            })
            .collect())
    }
}
