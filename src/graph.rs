// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Defines the structure of a statement graph.
//!
//! A statement graph is a control-flow graph whose nodes each carry one statement of a method
//! body.  Edges point from a statement at its possible successors, in execution order.  The graph
//! is the substrate that path enumeration and pattern detection operate on; it does not know how
//! it was produced, and this crate contains no front end that builds one from source code or
//! bytecode.
//!
//! ## Identity and equivalence
//!
//! Nodes, values, and types all live in arenas owned by a [`StatementGraph`][], and are referred
//! to by [`Handle`][]s.  Handle equality is _reference_ identity: two nodes with identical
//! payloads are still different nodes.  Pattern detection instead works with _equivalence_
//! ([`nodes_equivalent`][]): two nodes are equivalent when they have the same statement kind and
//! the same structural shape, with operand types compatible, regardless of which concrete
//! variables or constants appear in them.  `x = y + 1` and `a = b + 2` are equivalent; `x = y`
//! and `return x` are not.
//!
//! Values are matched by shape, never by name: the same local variable must be expressed by
//! reusing the same `Handle<Value>`, which is what the generalized comparator's tagging relies
//! on.
//!
//! [`StatementGraph`]: struct.StatementGraph.html
//! [`Handle`]: ../arena/struct.Handle.html
//! [`nodes_equivalent`]: struct.StatementGraph.html#method.nodes_equivalent

use std::fmt::Display;
use std::ops::Index;

use controlled_option::ControlledOption;
use fxhash::FxHashMap;
use smallvec::SmallVec;

use crate::arena::Arena;
use crate::arena::Handle;

//-------------------------------------------------------------------------------------------------
// String content

#[repr(C)]
struct InternedStringContent {
    // See InternedStringArena below for how we fill in these fields safely.
    start: *const u8,
    len: usize,
}

const INITIAL_STRING_CAPACITY: usize = 512;

/// The content of each interned string is stored in one of the buffers inside of a
/// `InternedStringArena` instance, following the trick [described by Aleksey Kladov][interner].
///
/// The buffers stored in this type are preallocated, and are never allowed to grow.  That ensures
/// that pointers into the buffer are stable, as long as the buffer has not been destroyed.
/// (`InternedStringContent` instances are also stored in an arena, ensuring that the strings that
/// we hand out don't outlive the buffers.)
///
/// [interner]: https://matklad.github.io/2020/03/22/fast-simple-rust-interner.html
struct InternedStringArena {
    current_buffer: Vec<u8>,
    full_buffers: Vec<Vec<u8>>,
}

impl InternedStringArena {
    fn new() -> InternedStringArena {
        InternedStringArena {
            current_buffer: Vec::with_capacity(INITIAL_STRING_CAPACITY),
            full_buffers: Vec::new(),
        }
    }

    // Adds a new string.  This does not check whether we've already stored a string with the same
    // content; that is handled down below in `StatementGraph::add_symbol`.
    fn add(&mut self, value: &str) -> InternedStringContent {
        // Is there enough room in current_buffer to hold this string?
        let value = value.as_bytes();
        let len = value.len();
        let capacity = self.current_buffer.capacity();
        let remaining_capacity = capacity - self.current_buffer.len();
        if len > remaining_capacity {
            // If not, move current_buffer over into full_buffers (so that we hang onto it until
            // we're dropped) and allocate a new current_buffer that's at least big enough to hold
            // this string.
            let new_capacity = (capacity.max(len) + 1).next_power_of_two();
            let new_buffer = Vec::with_capacity(new_capacity);
            let old_buffer = std::mem::replace(&mut self.current_buffer, new_buffer);
            self.full_buffers.push(old_buffer);
        }

        // Copy the string's content into current_buffer and return a pointer to it.  That pointer
        // is stable since we never allow the current_buffer to be resized — once we run out of
        // room, we allocate a _completely new buffer_ to replace it.
        let start_index = self.current_buffer.len();
        self.current_buffer.extend_from_slice(value);
        let start = unsafe { self.current_buffer.as_ptr().add(start_index) };
        InternedStringContent { start, len }
    }
}

impl InternedStringContent {
    /// Returns the content of this string as a `str`.  This is safe as long as the lifetime of
    /// the InternedStringContent is outlived by the lifetime of the InternedStringArena that
    /// holds its data.  That is guaranteed because we store the interned strings in an Arena
    /// alongside the InternedStringArena, and only hand out references to them.
    fn as_str(&self) -> &str {
        unsafe {
            let bytes = std::slice::from_raw_parts(self.start, self.len);
            std::str::from_utf8_unchecked(bytes)
        }
    }

    // Returns a supposedly 'static reference to the string's data.  The string data isn't really
    // static, but we are careful only to use this as a key in the HashMap that StatementGraph
    // uses to track whether we've stored a particular symbol already.  That HashMap lives
    // alongside the InternedStringArena that holds the data, so we can get away with a
    // technically incorrect 'static lifetime here.  As an extra precaution, this method is marked
    // as unsafe so that we don't inadvertently call it from anywhere else in the crate.
    unsafe fn as_hash_key(&self) -> &'static str {
        let bytes = std::slice::from_raw_parts(self.start, self.len);
        std::str::from_utf8_unchecked(bytes)
    }
}

unsafe impl Send for InternedStringContent {}
unsafe impl Sync for InternedStringContent {}

//-------------------------------------------------------------------------------------------------
// Symbols

/// An interned name appearing somewhere in a statement graph.
///
/// Symbols are how we store the names of local variables, invoked methods, value types, and the
/// rendered text of constants.  None of them participate in node equivalence; they exist so that
/// graphs can be displayed and debugged.
///
/// We deduplicate `Symbol` instances in a `StatementGraph` — that is, we ensure that there are
/// never multiple `Symbol` instances with the same content.  That means that you can compare
/// _handles_ to symbols using simple equality, without having to dereference into the
/// `StatementGraph` arena.
#[repr(C)]
pub struct Symbol {
    content: InternedStringContent,
}

impl Symbol {
    fn as_str(&self) -> &str {
        self.content.as_str()
    }
}

impl StatementGraph {
    /// Adds a symbol to the graph, ensuring that there's only ever one copy of a particular
    /// symbol stored in the graph.
    pub fn add_symbol<S: AsRef<str> + ?Sized>(&mut self, symbol: &S) -> Handle<Symbol> {
        let symbol = symbol.as_ref();
        if let Some(handle) = self.symbol_handles.get(symbol) {
            return *handle;
        }

        let interned = self.interned_strings.add(symbol);
        let hash_key = unsafe { interned.as_hash_key() };
        let handle = self.symbols.add(Symbol { content: interned });
        self.symbol_handles.insert(hash_key, handle);
        handle
    }

    /// Returns an iterator over all of the handles of all of the symbols in this graph.  (Note
    /// that because we're only returning _handles_, this iterator does not retain a reference to
    /// the `StatementGraph`.)
    pub fn iter_symbols(&self) -> impl Iterator<Item = Handle<Symbol>> {
        self.symbols.iter_handles()
    }
}

impl Index<Handle<Symbol>> for StatementGraph {
    type Output = str;
    #[inline(always)]
    fn index(&self, handle: Handle<Symbol>) -> &str {
        self.symbols.get(handle).as_str()
    }
}

#[doc(hidden)]
pub struct DisplaySymbol<'a> {
    wrapped: Handle<Symbol>,
    graph: &'a StatementGraph,
}

impl<'a> Display for DisplaySymbol<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", &self.graph[self.wrapped])
    }
}

impl Handle<Symbol> {
    pub fn display(self, graph: &StatementGraph) -> impl Display + '_ {
        DisplaySymbol {
            wrapped: self,
            graph,
        }
    }
}

//-------------------------------------------------------------------------------------------------
// Value types

/// The declared type of a [`Value`][], with an optional supertype link.
///
/// Types form a forest via their supertype chains.  Two types are _compatible_ when they are
/// equal or one is a (transitive) subtype of the other; compatibility is what node equivalence
/// uses, so that a statement operating on a subtype matches the same statement operating on its
/// supertype.
///
/// [`Value`]: struct.Value.html
pub struct ValueType {
    /// The name of this type.
    pub name: Handle<Symbol>,
    /// The type this type directly extends, if any.
    pub supertype: ControlledOption<Handle<ValueType>>,
}

impl StatementGraph {
    /// Adds a value type to the graph, deduplicating by name: adding a name that already exists
    /// returns the existing handle, and the supertype given at first registration wins.
    pub fn add_value_type<S: AsRef<str> + ?Sized>(
        &mut self,
        name: &S,
        supertype: Option<Handle<ValueType>>,
    ) -> Handle<ValueType> {
        let name = self.add_symbol(name);
        if let Some(handle) = self.value_type_handles.get(&name) {
            return *handle;
        }

        let supertype = match supertype {
            Some(supertype) => ControlledOption::some(supertype),
            None => ControlledOption::none(),
        };
        let handle = self.value_types.add(ValueType { name, supertype });
        self.value_type_handles.insert(name, handle);
        handle
    }

    /// Returns whether `sub` is a transitive subtype of `sup`.  A type is not a subtype of
    /// itself.
    pub fn is_subtype_of(&self, sub: Handle<ValueType>, sup: Handle<ValueType>) -> bool {
        let mut current = self[sub].supertype.into_option();
        while let Some(ty) = current {
            if ty == sup {
                return true;
            }
            current = self[ty].supertype.into_option();
        }
        false
    }

    /// Returns whether two value types are compatible: equal, or in a subtype relationship in
    /// either direction.
    pub fn value_types_compatible(
        &self,
        left: Handle<ValueType>,
        right: Handle<ValueType>,
    ) -> bool {
        left == right || self.is_subtype_of(left, right) || self.is_subtype_of(right, left)
    }
}

impl Index<Handle<ValueType>> for StatementGraph {
    type Output = ValueType;
    #[inline(always)]
    fn index(&self, handle: Handle<ValueType>) -> &ValueType {
        self.value_types.get(handle)
    }
}

impl Handle<ValueType> {
    pub fn display(self, graph: &StatementGraph) -> impl Display + '_ {
        graph[self].name.display(graph)
    }
}

//-------------------------------------------------------------------------------------------------
// Values

/// A value appearing as an operand of a statement.
///
/// Values carry their declared type and an expression shape.  They are _not_ deduplicated: every
/// call to [`add_value`][] creates a fresh handle, and a caller expresses "this statement uses
/// the same variable as that one" by reusing the handle.  The generalized comparator keys its
/// tags on value handles, so this identity is semantically significant.
///
/// [`add_value`]: struct.StatementGraph.html#method.add_value
pub struct Value {
    /// The declared type of this value.
    pub ty: Handle<ValueType>,
    /// The expression shape of this value.
    pub expr: ValueExpr,
}

/// The expression shape of a [`Value`][].
///
/// [`Value`]: struct.Value.html
pub enum ValueExpr {
    /// A local variable.
    Local {
        /// The variable's name.
        name: Handle<Symbol>,
    },
    /// A literal constant.
    Constant {
        /// The constant's rendered text.
        literal: Handle<Symbol>,
    },
    /// A binary expression over two operand values.
    Binary {
        operator: BinaryOperator,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    },
    /// A method invocation.
    Invoke {
        /// The name of the invoked method.
        method: Handle<Symbol>,
        /// The receiver of the invocation, if it has one.
        receiver: ControlledOption<Handle<Value>>,
        /// The argument values, in order.
        arguments: SmallVec<[Handle<Value>; 2]>,
    },
}

/// The operator of a [`ValueExpr::Binary`][] expression.
///
/// The relational operators are the ones branch coercion knows how to flip; see
/// [`flipped`][].
///
/// [`ValueExpr::Binary`]: enum.ValueExpr.html
/// [`flipped`]: #method.flipped
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    /// Returns the operator accepting exactly the operand pairs this one rejects, or `None` for
    /// the arithmetic operators, which have no such counterpart.
    pub fn flipped(self) -> Option<BinaryOperator> {
        match self {
            BinaryOperator::Eq => Some(BinaryOperator::Ne),
            BinaryOperator::Ne => Some(BinaryOperator::Eq),
            BinaryOperator::Ge => Some(BinaryOperator::Lt),
            BinaryOperator::Lt => Some(BinaryOperator::Ge),
            BinaryOperator::Gt => Some(BinaryOperator::Le),
            BinaryOperator::Le => Some(BinaryOperator::Gt),
            _ => None,
        }
    }

    fn token(self) -> &'static str {
        match self {
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Le => "<=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
        }
    }
}

impl StatementGraph {
    /// Adds a value to the graph.  Values are never deduplicated; each call returns a fresh
    /// handle.
    pub fn add_value(&mut self, ty: Handle<ValueType>, expr: ValueExpr) -> Handle<Value> {
        self.values.add(Value { ty, expr })
    }

    /// Adds a local variable value.
    pub fn add_local<S: AsRef<str> + ?Sized>(
        &mut self,
        name: &S,
        ty: Handle<ValueType>,
    ) -> Handle<Value> {
        let name = self.add_symbol(name);
        self.add_value(ty, ValueExpr::Local { name })
    }

    /// Adds a constant value.
    pub fn add_constant<S: AsRef<str> + ?Sized>(
        &mut self,
        literal: &S,
        ty: Handle<ValueType>,
    ) -> Handle<Value> {
        let literal = self.add_symbol(literal);
        self.add_value(ty, ValueExpr::Constant { literal })
    }

    /// Adds a binary expression value.
    pub fn add_binary(
        &mut self,
        operator: BinaryOperator,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
        ty: Handle<ValueType>,
    ) -> Handle<Value> {
        self.add_value(ty, ValueExpr::Binary { operator, lhs, rhs })
    }

    /// Adds a method invocation value.
    pub fn add_invocation<S: AsRef<str> + ?Sized>(
        &mut self,
        method: &S,
        receiver: Option<Handle<Value>>,
        arguments: &[Handle<Value>],
        ty: Handle<ValueType>,
    ) -> Handle<Value> {
        let method = self.add_symbol(method);
        let receiver = match receiver {
            Some(receiver) => ControlledOption::some(receiver),
            None => ControlledOption::none(),
        };
        self.add_value(
            ty,
            ValueExpr::Invoke {
                method,
                receiver,
                arguments: SmallVec::from_slice(arguments),
            },
        )
    }

    /// Returns whether two values are equivalent: same expression shape (same variant, same
    /// binary operator, same invoked method), compatible types, and equivalent sub-values,
    /// pairwise.  Local names and constant literals do not participate; a value is matched by
    /// shape, and the generalized comparator is what decides whether concrete values are used
    /// consistently.
    pub fn values_equivalent(&self, left: Handle<Value>, right: Handle<Value>) -> bool {
        let left_value = &self[left];
        let right_value = &self[right];
        if !self.value_types_compatible(left_value.ty, right_value.ty) {
            return false;
        }
        match (&left_value.expr, &right_value.expr) {
            (ValueExpr::Local { .. }, ValueExpr::Local { .. }) => true,
            (ValueExpr::Constant { .. }, ValueExpr::Constant { .. }) => true,
            (
                ValueExpr::Binary {
                    operator: left_operator,
                    lhs: left_lhs,
                    rhs: left_rhs,
                },
                ValueExpr::Binary {
                    operator: right_operator,
                    lhs: right_lhs,
                    rhs: right_rhs,
                },
            ) => {
                left_operator == right_operator
                    && self.values_equivalent(*left_lhs, *right_lhs)
                    && self.values_equivalent(*left_rhs, *right_rhs)
            }
            (
                ValueExpr::Invoke {
                    method: left_method,
                    receiver: left_receiver,
                    arguments: left_arguments,
                },
                ValueExpr::Invoke {
                    method: right_method,
                    receiver: right_receiver,
                    arguments: right_arguments,
                },
            ) => {
                left_method == right_method
                    && match (left_receiver.into_option(), right_receiver.into_option()) {
                        (None, None) => true,
                        (Some(left), Some(right)) => self.values_equivalent(left, right),
                        _ => false,
                    }
                    && left_arguments.len() == right_arguments.len()
                    && left_arguments
                        .iter()
                        .zip(right_arguments.iter())
                        .all(|(left, right)| self.values_equivalent(*left, *right))
            }
            _ => false,
        }
    }

    // A small code identifying the shape of a value, folded into equivalence hashes.  Types are
    // deliberately absent: subtype-compatible values must land in the same bucket.
    fn value_kind_code(&self, value: Handle<Value>) -> u64 {
        match &self[value].expr {
            ValueExpr::Local { .. } => 2,
            ValueExpr::Constant { .. } => 3,
            ValueExpr::Binary { operator, .. } => 5 + *operator as u64,
            ValueExpr::Invoke { method, .. } => 17 + method.as_u32() as u64,
        }
    }
}

impl Index<Handle<Value>> for StatementGraph {
    type Output = Value;
    #[inline(always)]
    fn index(&self, handle: Handle<Value>) -> &Value {
        self.values.get(handle)
    }
}

#[doc(hidden)]
pub struct DisplayValue<'a> {
    wrapped: Handle<Value>,
    graph: &'a StatementGraph,
}

impl<'a> Display for DisplayValue<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let graph = self.graph;
        match &graph[self.wrapped].expr {
            ValueExpr::Local { name } => write!(f, "{}", name.display(graph)),
            ValueExpr::Constant { literal } => write!(f, "{}", literal.display(graph)),
            ValueExpr::Binary { operator, lhs, rhs } => write!(
                f,
                "{} {} {}",
                lhs.display(graph),
                operator.token(),
                rhs.display(graph),
            ),
            ValueExpr::Invoke {
                method,
                receiver,
                arguments,
            } => {
                if let Some(receiver) = receiver.into_option() {
                    write!(f, "{}.", receiver.display(graph))?;
                }
                write!(f, "{}(", method.display(graph))?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument.display(graph))?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Handle<Value> {
    pub fn display(self, graph: &StatementGraph) -> impl Display + '_ {
        DisplayValue {
            wrapped: self,
            graph,
        }
    }
}

//-------------------------------------------------------------------------------------------------
// Statements

/// The statement payload of a [`Node`][].
///
/// Each variant knows which of its operands are _values_ (see [`values`][]); those are the
/// operands that participate in node equivalence and in generalized comparison.  Branch targets
/// are node handles and are not part of equivalence: all `Goto`s are mutually equivalent, and two
/// `If`s are equivalent exactly when their conditions are.
///
/// The `Exit` variant is the sentinel that path enumeration temporarily attaches below the leaves
/// of a graph.  It never appears in an enumerated path, and the generalized comparator refuses to
/// interpret it.
///
/// [`Node`]: struct.Node.html
/// [`values`]: #method.values
#[derive(Clone)]
pub enum Statement {
    /// An assignment of a source value to a target value.
    Assign {
        target: Handle<Value>,
        source: Handle<Value>,
    },
    /// A method invocation whose result is discarded.
    Invoke { call: Handle<Value> },
    /// A conditional jump: control transfers to `target` when the condition holds, and falls
    /// through otherwise.
    If {
        condition: Handle<Value>,
        target: Handle<Node>,
    },
    /// A multi-way jump over a key value.
    Switch {
        key: Handle<Value>,
        targets: SmallVec<[Handle<Node>; 4]>,
        default_target: Handle<Node>,
    },
    /// An unconditional jump.
    Goto { target: Handle<Node> },
    /// A return of a value.
    Return { value: Handle<Value> },
    /// A return without a value.
    ReturnVoid,
    /// A thrown value.
    Throw { value: Handle<Value> },
    /// The synthetic sentinel attached below leaves during path enumeration.
    Exit,
}

impl Statement {
    /// Returns the top-level operand values of this statement, in order.  This is the operand
    /// list that node equivalence and generalized comparison walk.
    pub fn values(&self) -> SmallVec<[Handle<Value>; 2]> {
        match self {
            Statement::Assign { target, source } => smallvec::smallvec![*target, *source],
            Statement::Invoke { call } => smallvec::smallvec![*call],
            Statement::If { condition, .. } => smallvec::smallvec![*condition],
            Statement::Switch { key, .. } => smallvec::smallvec![*key],
            Statement::Goto { .. } => SmallVec::new(),
            Statement::Return { value } => smallvec::smallvec![*value],
            Statement::ReturnVoid => SmallVec::new(),
            Statement::Throw { value } => smallvec::smallvec![*value],
            Statement::Exit => SmallVec::new(),
        }
    }

    /// Returns whether this statement transfers control anywhere other than straight ahead.
    pub fn branches(&self) -> bool {
        matches!(
            self,
            Statement::If { .. } | Statement::Switch { .. } | Statement::Goto { .. }
        )
    }

    /// Returns whether this statement is the enumeration sentinel.
    pub fn is_exit(&self) -> bool {
        matches!(self, Statement::Exit)
    }

    pub(crate) fn kind_code(&self) -> u64 {
        match self {
            Statement::Assign { .. } => 0,
            Statement::Invoke { .. } => 1,
            Statement::If { .. } => 2,
            Statement::Switch { .. } => 3,
            Statement::Goto { .. } => 4,
            Statement::Return { .. } => 5,
            Statement::ReturnVoid => 6,
            Statement::Throw { .. } => 7,
            Statement::Exit => 8,
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Statement::Assign { .. } => "assign",
            Statement::Invoke { .. } => "invoke",
            Statement::If { .. } => "if",
            Statement::Switch { .. } => "switch",
            Statement::Goto { .. } => "goto",
            Statement::Return { .. } => "return",
            Statement::ReturnVoid => "return-void",
            Statement::Throw { .. } => "throw",
            Statement::Exit => "exit",
        }
    }
}

//-------------------------------------------------------------------------------------------------
// Nodes

/// A node of a statement graph: one statement plus its ordered successor list.
pub struct Node {
    pub(crate) statement: Statement,
    pub(crate) successors: SmallVec<[Handle<Node>; 2]>,
}

impl Node {
    /// The statement this node carries.
    #[inline(always)]
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// The successors of this node, in order.
    #[inline(always)]
    pub fn successors(&self) -> &[Handle<Node>] {
        &self.successors
    }
}

impl StatementGraph {
    /// Adds a node to the graph, with no successors yet.
    pub fn add_node(&mut self, statement: Statement) -> Handle<Node> {
        self.nodes.add(Node {
            statement,
            successors: SmallVec::new(),
        })
    }

    /// Adds an edge from `source` to `sink`, appending to `source`'s successor list.  There is
    /// one successor entry per logical edge: adding an edge that is already present does
    /// nothing.
    pub fn add_edge(&mut self, source: Handle<Node>, sink: Handle<Node>) {
        let successors = &mut self.nodes.get_mut(source).successors;
        if !successors.contains(&sink) {
            successors.push(sink);
        }
    }

    /// Returns the successors of a node, in order.
    #[inline(always)]
    pub fn successors(&self, node: Handle<Node>) -> &[Handle<Node>] {
        &self.nodes.get(node).successors
    }

    /// Returns an iterator over all of the node handles in this graph, in insertion order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = Handle<Node>> {
        self.nodes.iter_handles()
    }

    /// Returns whether two nodes are equivalent: same statement kind, and top-level operand
    /// values pairwise equivalent (see [`values_equivalent`][]).
    ///
    /// [`values_equivalent`]: #method.values_equivalent
    pub fn nodes_equivalent(&self, left: Handle<Node>, right: Handle<Node>) -> bool {
        let left_statement = self[left].statement();
        let right_statement = self[right].statement();
        if std::mem::discriminant(left_statement) != std::mem::discriminant(right_statement) {
            return false;
        }
        // Same kind implies same operand arity.
        left_statement
            .values()
            .iter()
            .zip(right_statement.values().iter())
            .all(|(left, right)| self.values_equivalent(*left, *right))
    }

    /// Returns a hash that is equal for any two equivalent nodes: the statement kind plus its
    /// position-weighted operand shapes.  Operand _types_ are left out, since
    /// subtype-compatible operands must hash alike.
    pub fn node_equiv_hash(&self, node: Handle<Node>) -> u64 {
        let statement = self[node].statement();
        let mut hash = statement.kind_code();
        for (index, value) in statement.values().iter().enumerate() {
            hash = hash.wrapping_add((index as u64 + 1).wrapping_mul(self.value_kind_code(*value)));
        }
        hash
    }

    /// Copies a node: a fresh handle carrying a clone of the statement payload and of the
    /// successor list.  The copy is equivalent to the original but never identical to it.
    pub fn copy_node(&mut self, node: Handle<Node>) -> Handle<Node> {
        let statement = self[node].statement.clone();
        let successors = self[node].successors.clone();
        self.nodes.add(Node {
            statement,
            successors,
        })
    }

    pub(crate) fn node_mut(&mut self, node: Handle<Node>) -> &mut Node {
        self.nodes.get_mut(node)
    }
}

impl Index<Handle<Node>> for StatementGraph {
    type Output = Node;
    #[inline(always)]
    fn index(&self, handle: Handle<Node>) -> &Node {
        self.nodes.get(handle)
    }
}

#[doc(hidden)]
pub struct DisplayNode<'a> {
    wrapped: Handle<Node>,
    graph: &'a StatementGraph,
}

impl<'a> Display for DisplayNode<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let graph = self.graph;
        match graph[self.wrapped].statement() {
            Statement::Assign { target, source } => {
                write!(f, "{} = {}", target.display(graph), source.display(graph))
            }
            Statement::Invoke { call } => write!(f, "{}", call.display(graph)),
            Statement::If { condition, target } => write!(
                f,
                "if {} goto [{}]",
                condition.display(graph),
                target.as_u32(),
            ),
            Statement::Switch {
                key,
                targets,
                default_target,
            } => {
                write!(f, "switch {} [", key.display(graph))?;
                for (index, target) in targets.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", target.as_u32())?;
                }
                write!(f, "] default [{}]", default_target.as_u32())
            }
            Statement::Goto { target } => write!(f, "goto [{}]", target.as_u32()),
            Statement::Return { value } => write!(f, "return {}", value.display(graph)),
            Statement::ReturnVoid => write!(f, "return"),
            Statement::Throw { value } => write!(f, "throw {}", value.display(graph)),
            Statement::Exit => write!(f, "<exit>"),
        }
    }
}

impl Handle<Node> {
    pub fn display(self, graph: &StatementGraph) -> impl Display + '_ {
        DisplayNode {
            wrapped: self,
            graph,
        }
    }
}

//-------------------------------------------------------------------------------------------------
// Statement graphs

/// Contains all of the nodes, values, and types of one statement graph.
pub struct StatementGraph {
    interned_strings: InternedStringArena,
    symbols: Arena<Symbol>,
    symbol_handles: FxHashMap<&'static str, Handle<Symbol>>,
    value_types: Arena<ValueType>,
    value_type_handles: FxHashMap<Handle<Symbol>, Handle<ValueType>>,
    values: Arena<Value>,
    nodes: Arena<Node>,
}

impl StatementGraph {
    /// Creates a new, initially empty statement graph.
    pub fn new() -> StatementGraph {
        StatementGraph::default()
    }
}

impl Default for StatementGraph {
    fn default() -> StatementGraph {
        StatementGraph {
            interned_strings: InternedStringArena::new(),
            symbols: Arena::new(),
            symbol_handles: FxHashMap::default(),
            value_types: Arena::new(),
            value_type_handles: FxHashMap::default(),
            values: Arena::new(),
            nodes: Arena::new(),
        }
    }
}
