//! Abstract introspection boundary to the debugged process
//!
//! The analyzer never touches the inspected process directly. A host
//! (a debugger plugin, a core-file reader) implements these traits
//! and owns every representation detail: how types and values are
//! stored, how memory is read, how the allocator's bookkeeping is
//! queried. Handles are opaque to the analyzer and cheap to clone.
//!
//! Navigation methods return `Option`: `None` always means "this
//! branch cannot be followed" (optimized out, unreadable, absent in
//! the object's actual layout) and is never an abort. Only the
//! allocator oracle and the thread/symbol enumeration surfaces can
//! report hard errors, and callers contain those per root.

use crate::core::types::{Address, Field, HeapBlock, InspectResult, ThreadId, TypeKind};

/// Type introspection: the normalized view of a static type
pub trait TypeInspect {
    /// Opaque handle to a type in the inspected process
    type TypeRef: Clone;

    /// Structural kind of the type
    fn type_kind(&self, ty: &Self::TypeRef) -> TypeKind;

    /// Size of the type in bytes
    fn type_size(&self, ty: &Self::TypeRef) -> usize;

    /// Human-readable type name, if the host knows one
    fn type_name(&self, ty: &Self::TypeRef) -> Option<String>;

    /// Strips typedef and reference wrappers down to the underlying
    /// structural kind
    fn basic_type(&self, ty: &Self::TypeRef) -> Self::TypeRef;

    /// Pointee type of a pointer/reference, or element type of an
    /// array
    fn target_type(&self, ty: &Self::TypeRef) -> Option<Self::TypeRef>;

    /// Ordered members of a struct or union; empty for other kinds
    fn fields(&self, ty: &Self::TypeRef) -> Vec<Field<Self::TypeRef>>;
}

/// Value navigation over typed locations in the inspected process
pub trait ValueInspect: TypeInspect {
    /// Opaque handle to a value (a typed location), a transient view
    /// produced on demand
    type ValueRef: Clone;

    /// Static type of the value
    fn value_type(&self, value: &Self::ValueRef) -> Self::TypeRef;

    /// Address of the value, absent for register-resident or
    /// optimized-out values
    fn address_of(&self, value: &Self::ValueRef) -> Option<Address>;

    /// Whether the value's contents can be read at all
    fn is_accessible(&self, value: &Self::ValueRef) -> bool;

    /// Most-derived runtime type of a polymorphic value, reported
    /// only when it differs from the static type
    fn dynamic_type(&self, value: &Self::ValueRef) -> Option<Self::TypeRef>;

    /// Reinterprets the value as another type (base-class subobjects,
    /// dynamic-type re-resolution)
    fn cast(&self, value: &Self::ValueRef, ty: &Self::TypeRef) -> Option<Self::ValueRef>;

    /// Follows a pointer/reference to the value it designates
    fn dereference(&self, value: &Self::ValueRef) -> Option<Self::ValueRef>;

    /// Element of an array value
    fn element_at(&self, value: &Self::ValueRef, index: usize) -> Option<Self::ValueRef>;

    /// Member of a struct/union value, by field; `None` when the
    /// field is absent in this object's actual layout
    fn field_value(
        &self,
        value: &Self::ValueRef,
        field: &Field<Self::TypeRef>,
    ) -> Option<Self::ValueRef>;

    /// The pointee address stored in a pointer-typed value
    fn pointer_address(&self, value: &Self::ValueRef) -> Option<Address>;
}

/// Liveness oracle over the allocator's bookkeeping
pub trait HeapInspect {
    /// Returns the heap block containing the address, if the
    /// allocator tracks one there
    fn block_at(&self, address: Address) -> InspectResult<Option<HeapBlock>>;

    /// Heap-walk cursor: `None` starts the walk from the first
    /// block, otherwise returns the block following the given base
    fn next_block(&self, after: Option<Address>) -> InspectResult<Option<HeapBlock>>;
}

/// Per-thread stack walking of the inspected process
///
/// The host carries a "selected thread" the way debuggers do; frame
/// queries operate on the current selection. Selection is restored
/// by the scan orchestration, never by the host.
pub trait StackInspect: ValueInspect {
    /// Opaque handle to a stack frame
    type FrameRef: Clone;

    /// Opaque handle to a lexical scope within a frame
    type ScopeRef: Clone;

    /// All threads of the inspected process
    fn thread_ids(&self) -> InspectResult<Vec<ThreadId>>;

    /// The currently selected thread, if any
    fn selected_thread(&self) -> InspectResult<Option<ThreadId>>;

    /// Makes the given thread current
    fn select_thread(&self, thread: ThreadId) -> InspectResult<()>;

    /// Innermost frame of the selected thread
    fn newest_frame(&self) -> InspectResult<Option<Self::FrameRef>>;

    /// The next-outer frame
    fn older_frame(&self, frame: &Self::FrameRef) -> Option<Self::FrameRef>;

    /// Function name of the frame, if known
    fn frame_name(&self, frame: &Self::FrameRef) -> Option<String>;

    /// Innermost lexical scope of the frame; absent without debug
    /// info
    fn frame_scope(&self, frame: &Self::FrameRef) -> Option<Self::ScopeRef>;

    /// Enclosing lexical scope
    fn parent_scope(&self, scope: &Self::ScopeRef) -> Option<Self::ScopeRef>;

    /// Whether the scope holds globals/statics rather than frame
    /// locals
    fn is_static_scope(&self, scope: &Self::ScopeRef) -> bool;

    /// Named local variables declared in the scope, resolved against
    /// the frame; the host filters out non-variable symbols and
    /// symbols it cannot resolve to values
    fn scope_variables(
        &self,
        scope: &Self::ScopeRef,
        frame: &Self::FrameRef,
    ) -> Vec<(String, Self::ValueRef)>;
}

/// A global or file-static variable surfaced by the host
#[derive(Debug, Clone)]
pub struct GlobalVariable<V> {
    pub name: String,
    pub source_file: Option<String>,
    pub value: V,
}

/// Symbol and expression entry points
pub trait SymbolInspect: ValueInspect {
    /// Evaluates an expression in the current context; `Ok(None)`
    /// when it parses but has no value
    fn evaluate(&self, expr: &str) -> InspectResult<Option<Self::ValueRef>>;

    /// Looks up a global/static variable by name
    fn lookup_global(&self, name: &str) -> InspectResult<Option<Self::ValueRef>>;

    /// All global and file-static variables with resolvable values
    fn global_variables(&self) -> InspectResult<Vec<GlobalVariable<Self::ValueRef>>>;
}

/// Everything the whole-process scan needs from a host
pub trait DebugHost: StackInspect + SymbolInspect + HeapInspect {}

impl<T> DebugHost for T where T: StackInspect + SymbolInspect + HeapInspect {}
