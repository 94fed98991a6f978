//! Heap-reachability traversal over a typed value graph
//!
//! Given a root value, walks every value transitively reachable
//! through pointers, arrays, and struct/union members, and charges
//! each live heap block found along the way to a running total
//! exactly once. Traversal order carries no meaning: counting is
//! deduplicated by address, so any work-list order yields the same
//! totals.

use crate::analyze::visited::{VisitedBlocks, VisitedValues};
use crate::core::types::{Address, HeapUsage, TypeKind};
use crate::host::{HeapInspect, TypeInspect, ValueInspect};
use tracing::{debug, trace};

/// Pointees and members smaller than this are never expanded;
/// scalar-sized targets cannot own further heap memory worth
/// following.
pub const MIN_EXPAND_SIZE: usize = 8;

/// Work-list reachability engine over a host's value graph
pub struct Traverser<'a, H: ValueInspect + HeapInspect> {
    host: &'a H,
    min_expand_size: usize,
}

impl<'a, H: ValueInspect + HeapInspect> Traverser<'a, H> {
    /// Creates a traverser with the default expansion threshold
    pub fn new(host: &'a H) -> Self {
        Traverser {
            host,
            min_expand_size: MIN_EXPAND_SIZE,
        }
    }

    /// Overrides the minimum pointee/member size worth expanding
    pub fn with_min_expand_size(mut self, size: usize) -> Self {
        self.min_expand_size = size;
        self
    }

    /// Measures the heap memory transitively reachable from `root`
    ///
    /// Blocks already present in `counted` are not billed again, so
    /// a ledger shared across several roots attributes memory
    /// reachable from more than one of them exactly once overall.
    /// Returns only what this call charged.
    pub fn measure(&self, label: &str, root: H::ValueRef, counted: &mut VisitedBlocks) -> HeapUsage {
        let mut usage = HeapUsage::new();
        let mut seen = VisitedValues::new();
        let mut work: Vec<(String, H::ValueRef)> = vec![(label.to_string(), root)];

        while let Some((name, value)) = work.pop() {
            if !self.host.is_accessible(&value) {
                trace!(name = %name, "value inaccessible, skipping");
                continue;
            }

            // An address reached through a second path has already
            // been expanded; skip the whole item.
            let parent_addr = match self.host.address_of(&value) {
                Some(addr) => {
                    if !seen.claim(addr) {
                        trace!(name = %name, address = %addr, "value repeated, skipping");
                        continue;
                    }
                    Some(addr)
                }
                None => None,
            };

            let ty = self.host.basic_type(&self.host.value_type(&value));
            match self.host.type_kind(&ty) {
                TypeKind::Pointer => {
                    self.follow_pointer(&name, value, ty, counted, &mut usage, &mut work);
                }
                TypeKind::Array => {
                    self.expand_array(&name, &value, &ty, parent_addr, &mut seen, &mut work);
                }
                TypeKind::Struct | TypeKind::Union => {
                    self.expand_members(&name, &value, &ty, parent_addr, &mut seen, &mut work);
                }
                TypeKind::Reference
                | TypeKind::Typedef
                | TypeKind::Primitive
                | TypeKind::Other => {}
            }
        }

        usage
    }

    fn follow_pointer(
        &self,
        name: &str,
        value: H::ValueRef,
        ty: H::TypeRef,
        counted: &mut VisitedBlocks,
        usage: &mut HeapUsage,
        work: &mut Vec<(String, H::ValueRef)>,
    ) {
        // A polymorphic pointee is traversed as its most-derived
        // runtime type, not the declared one.
        let (value, ty) = match self.host.dynamic_type(&value) {
            Some(dynamic) => match self.host.cast(&value, &dynamic) {
                Some(cast) => (cast, dynamic),
                None => (value, ty),
            },
            None => (value, ty),
        };

        let Some(target_addr) = self.host.pointer_address(&value) else {
            return;
        };
        if target_addr.is_null() {
            return;
        }

        let block = match self.host.block_at(target_addr) {
            Ok(found) => found,
            Err(err) => {
                debug!(address = %target_addr, error = %err, "allocator query failed");
                None
            }
        };
        let Some(block) = block else { return };
        if !block.in_use || !counted.claim(block.base) {
            return;
        }

        usage.add_block(&block);
        trace!(name = %name, block = %block, "charged heap block");

        let expandable = self
            .host
            .target_type(&ty)
            .map(|target| self.host.type_size(&target) >= self.min_expand_size)
            .unwrap_or(false);
        if expandable {
            if let Some(pointee) = self.host.dereference(&value) {
                work.push((format!("*({})", name), pointee));
            }
        }
    }

    fn expand_array(
        &self,
        name: &str,
        value: &H::ValueRef,
        ty: &H::TypeRef,
        parent_addr: Option<Address>,
        seen: &mut VisitedValues,
        work: &mut Vec<(String, H::ValueRef)>,
    ) {
        let Some(elem_ty) = self.host.target_type(ty) else {
            return;
        };
        let elem_size = self.host.type_size(&elem_ty);
        if elem_size == 0 {
            return;
        }
        let count = self.host.type_size(ty) / elem_size;

        for index in 0..count {
            let Some(element) = self.host.element_at(value, index) else {
                continue;
            };
            // The zero-index element shares the array's own address;
            // release the array's claim so the element still gets
            // expanded. Assumes the aliasing child is the container's
            // first element and never independently needs the claim.
            if let (Some(parent), Some(elem_addr)) = (parent_addr, self.host.address_of(&element)) {
                if parent == elem_addr {
                    seen.release(parent);
                }
            }
            work.push((format!("{}[{}]", name, index), element));
        }
    }

    fn expand_members(
        &self,
        name: &str,
        value: &H::ValueRef,
        ty: &H::TypeRef,
        parent_addr: Option<Address>,
        seen: &mut VisitedValues,
        work: &mut Vec<(String, H::ValueRef)>,
    ) {
        for field in self.host.fields(ty) {
            let member = if field.is_base_class {
                // Base-class subobjects are reached by reinterpreting
                // the object as the base type, not by member name.
                self.host.cast(value, &field.ty)
            } else if field.is_named() {
                self.host.field_value(value, &field)
            } else {
                None
            };
            let Some(member) = member else { continue };
            let Some(member_addr) = self.host.address_of(&member) else {
                continue;
            };

            // Scalar members below the threshold cannot own heap
            // memory; prune them. The kind gate is on the declared
            // member type, wrappers included.
            if self.host.type_size(&field.ty) < self.min_expand_size
                || !self.host.type_kind(&field.ty).may_own_heap()
            {
                continue;
            }

            // First declared member aliases the struct's own
            // address; release the struct's claim so the member
            // still gets expanded. Same caveat as for arrays.
            if parent_addr == Some(member_addr) {
                seen.release(member_addr);
            }
            work.push((format!("{}[{}]", name, field.name), member));
        }
    }
}
