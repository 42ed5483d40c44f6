//! Typed random-object generator.
//!
//! # Overview
//! `Randomer` owns a registry of per-type hooks and a seeded RNG. Given a
//! `TypeDesc` it either runs the hook registered for that exact type or
//! walks the type's structure:
//!
//! ```text
//! TypeDesc ──► registered? ──yes──► Hook::call(HookParams)
//!                  │no
//!                  ▼
//!   Record ─► per field: set_params > skip/omit rules > recurse
//!   Union  ─► one alternative, uniformly at random
//!   Tuple  ─► (first argument,)
//!   Sequence ─► [element]
//!   other  ─► Value::Null
//! ```
//!
//! `random_object` fills every field it is not told to skip. `random_partial`
//! fills only the fields named in `use_fields` and the record-typed fields on
//! the way to them; everything else becomes `Value::Omitted`. A record whose
//! fields are all omitted collapses to `Value::Omitted` itself, and so does a
//! list or tuple whose element collapsed.
//!
//! Field names in `ignore`, `only`, `use_fields` and `set_params` match either
//! the bare field name at any depth or its dotted path from the root
//! (`"val2.value1"`).
//!
//! Cyclic record graphs recurse until the stack overflows.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;

use crate::convert::Converter;
use crate::error::RandomError;
use crate::types::{Describe, Field, Primitive, RecordType, TypeDesc};
use crate::value::{Params, Record, Value};

/// Generation context forwarded to `Hook::Contextual` hooks.
///
/// `ignore`/`inverse` are set by `random_object`, `use_fields` by
/// `random_partial`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookParams<'a> {
    pub ignore: &'a [String],
    pub inverse: bool,
    pub use_fields: &'a [String],
    pub set_params: Option<&'a Params>,
}

impl<'a> HookParams<'a> {
    pub fn param(&self, name: &str) -> Option<&'a Value> {
        self.set_params.and_then(|p| p.get(name))
    }
}

type SimpleFn = dyn Fn() -> Value + Send + Sync;
type ContextualFn = dyn for<'a> Fn(&HookParams<'a>) -> Value + Send + Sync;

/// A generator registered for one exact type.
#[derive(Clone)]
pub enum Hook {
    /// Called with no arguments.
    Simple(Arc<SimpleFn>),
    /// Receives every generation parameter of the current call.
    Contextual(Arc<ContextualFn>),
}

impl Hook {
    pub fn simple<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Hook::Simple(Arc::new(f))
    }

    pub fn contextual<F>(f: F) -> Self
    where
        F: for<'a> Fn(&HookParams<'a>) -> Value + Send + Sync + 'static,
    {
        Hook::Contextual(Arc::new(f))
    }

    /// A hook that always returns a clone of `value`.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Hook::simple(move || value.clone())
    }

    pub fn accepts_params(&self) -> bool {
        matches!(self, Hook::Contextual(_))
    }

    /// True when both handles point at the same function.
    pub fn ptr_eq(&self, other: &Hook) -> bool {
        match (self, other) {
            (Hook::Simple(a), Hook::Simple(b)) => Arc::ptr_eq(a, b),
            (Hook::Contextual(a), Hook::Contextual(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn call(&self, params: &HookParams<'_>) -> Value {
        match self {
            Hook::Simple(f) => f(),
            Hook::Contextual(f) => {
                tracing::debug!(?params, "passing generation params to hook");
                f(params)
            }
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Simple(_) => f.write_str("Hook::Simple"),
            Hook::Contextual(_) => f.write_str("Hook::Contextual"),
        }
    }
}

/// Options for `Randomer::random_object`.
#[derive(Debug, Clone, Default)]
pub struct ObjectOptions {
    /// Leave every field that declares a default at that default.
    pub required_only: bool,
    /// Fields not to generate.
    pub ignore: Vec<String>,
    /// The only fields to generate. Shorthand for `ignore` + `inverse`.
    pub only: Vec<String>,
    /// Flip `ignore` into "generate only these".
    pub inverse: bool,
    /// Values assigned verbatim to matching fields.
    pub set_params: Params,
}

impl ObjectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required_only(mut self) -> Self {
        self.required_only = true;
        self
    }

    pub fn ignore<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn inverse(mut self) -> Self {
        self.inverse = true;
        self
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_params.insert(field.into(), value.into());
        self
    }

    fn resolve(&self) -> Result<ObjectRequest<'_>, RandomError> {
        if !self.only.is_empty() && !self.ignore.is_empty() {
            return Err(RandomError::ConflictingFilters);
        }
        let (ignore, inverse) = if self.only.is_empty() {
            (self.ignore.as_slice(), self.inverse)
        } else {
            (self.only.as_slice(), true)
        };
        Ok(ObjectRequest {
            required_only: self.required_only,
            ignore,
            inverse,
            set_params: &self.set_params,
        })
    }
}

/// Options for `Randomer::random_partial`.
#[derive(Debug, Clone, Default)]
pub struct PartialOptions {
    /// Fields to populate. Empty populates nothing.
    pub use_fields: Vec<String>,
    /// Values assigned verbatim to matching fields.
    pub set_params: Params,
}

impl PartialOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.use_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_params.insert(field.into(), value.into());
        self
    }
}

struct ObjectRequest<'a> {
    required_only: bool,
    ignore: &'a [String],
    inverse: bool,
    set_params: &'a Params,
}

impl ObjectRequest<'_> {
    fn skips(&self, field: &Field, path: &str) -> bool {
        let listed = names_field(self.ignore, &field.name, path);
        (listed && !self.inverse)
            || (!self.ignore.is_empty() && !listed && self.inverse)
            || (self.required_only && field.has_default())
    }

    fn hook_params(&self) -> HookParams<'_> {
        HookParams {
            ignore: self.ignore,
            inverse: self.inverse,
            use_fields: &[],
            set_params: Some(self.set_params),
        }
    }
}

/// Random instance generator driven by type descriptors.
pub struct Randomer {
    hooks: HashMap<TypeDesc, Hook>,
    rng: StdRng,
}

impl Default for Randomer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Randomer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Randomer").field("hooks", &self.hooks).finish_non_exhaustive()
    }
}

impl Randomer {
    /// An empty registry with an OS-seeded RNG.
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// An empty registry whose union choices are reproducible for `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            hooks: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A registry with hooks for every primitive type.
    ///
    /// The primitive hooks draw from the thread RNG, so only union choices
    /// follow the instance seed.
    pub fn with_defaults() -> Self {
        let mut randomer = Self::new();
        randomer.add_types(default_hooks());
        randomer
    }

    pub fn available_hooks(&self) -> &HashMap<TypeDesc, Hook> {
        &self.hooks
    }

    /// Register `hook` for `ty`. A previous registration is replaced.
    pub fn add_type(&mut self, ty: TypeDesc, hook: Hook) {
        if self.hooks.contains_key(&ty) {
            tracing::warn!(%ty, "type already registered, overriding");
        }
        tracing::debug!(%ty, ?hook, "registering type");
        self.hooks.insert(ty, hook);
    }

    /// Register several hooks in iteration order.
    pub fn add_types(&mut self, hooks: impl IntoIterator<Item = (TypeDesc, Hook)>) {
        for (ty, hook) in hooks {
            self.add_type(ty, hook);
        }
    }

    /// The hook registered for exactly `ty`.
    pub fn get_hook(&self, ty: &TypeDesc) -> Result<&Hook, RandomError> {
        self.hooks
            .get(ty)
            .ok_or_else(|| RandomError::HookNotFound(ty.clone()))
    }

    /// Run the hook registered for exactly `ty`.
    pub fn run_hook(&self, ty: &TypeDesc, params: &HookParams<'_>) -> Result<Value, RandomError> {
        let value = self.get_hook(ty)?.call(params);
        tracing::debug!(%ty, ?value, "generated data for type");
        Ok(value)
    }

    /// Build a fully populated instance of `ty`.
    pub fn random_object(&mut self, ty: &TypeDesc, options: &ObjectOptions) -> Result<Value, RandomError> {
        let request = options.resolve()?;
        tracing::debug!(%ty, "generating random object");
        Ok(self.object_at(ty, &request, ""))
    }

    /// Alias of `random_object`.
    pub fn object(&mut self, ty: &TypeDesc, options: &ObjectOptions) -> Result<Value, RandomError> {
        self.random_object(ty, options)
    }

    /// Build an instance of `ty` holding only the requested fields.
    pub fn random_partial(&mut self, ty: &TypeDesc, options: &PartialOptions) -> Value {
        tracing::debug!(%ty, use_fields = ?options.use_fields, "generating partial object");
        self.partial_at(ty, options, "")
    }

    /// Alias of `random_partial`.
    pub fn partial(&mut self, ty: &TypeDesc, options: &PartialOptions) -> Value {
        self.random_partial(ty, options)
    }

    /// Generate a `T` through its `Describe` descriptor.
    pub fn generate<T>(&mut self, options: &ObjectOptions) -> Result<T, RandomError>
    where
        T: Describe + DeserializeOwned,
    {
        let value = self.random_object(&T::describe(), options)?;
        Ok(Converter::new().to_typed(&value)?)
    }

    fn object_at(&mut self, ty: &TypeDesc, request: &ObjectRequest<'_>, path: &str) -> Value {
        if let Some(hook) = self.hooks.get(ty) {
            return hook.call(&request.hook_params());
        }
        match ty {
            TypeDesc::Record(record) => {
                let mut fields = Vec::with_capacity(record.fields().len());
                for field in record.fields() {
                    let field_path = child_path(path, &field.name);
                    let value = if let Some(v) = lookup(request.set_params, &field.name, &field_path) {
                        v.clone()
                    } else if request.skips(field, &field_path) {
                        field.default.clone().unwrap_or(Value::Null)
                    } else {
                        self.object_at(&field.ty, request, &field_path)
                    };
                    fields.push((field.name.clone(), value));
                }
                let value = Value::Record(Record::new(record.name(), fields));
                tracing::trace!(record = record.name(), ?value, "generated record");
                value
            }
            TypeDesc::Union(alts) if !alts.is_empty() => {
                let alt = &alts[self.rng.random_range(0..alts.len())];
                self.object_at(alt, request, path)
            }
            TypeDesc::Tuple(items) if !items.is_empty() => {
                Value::Tuple(vec![self.object_at(&items[0], request, path)])
            }
            TypeDesc::Sequence(element) => Value::List(vec![self.object_at(element, request, path)]),
            _ => Value::Null,
        }
    }

    fn partial_at(&mut self, ty: &TypeDesc, options: &PartialOptions, path: &str) -> Value {
        if let Some(hook) = self.hooks.get(ty) {
            let params = HookParams {
                use_fields: &options.use_fields,
                set_params: Some(&options.set_params),
                ..HookParams::default()
            };
            return hook.call(&params);
        }
        match ty {
            TypeDesc::Record(record) => self.partial_record(record, options, path),
            TypeDesc::Union(alts) if !alts.is_empty() => {
                let alt = &alts[self.rng.random_range(0..alts.len())];
                self.partial_at(alt, options, path)
            }
            // A collapsed element collapses its container too.
            TypeDesc::Tuple(items) if !items.is_empty() => match self.partial_at(&items[0], options, path) {
                Value::Omitted => Value::Omitted,
                item => Value::Tuple(vec![item]),
            },
            TypeDesc::Sequence(element) => match self.partial_at(element, options, path) {
                Value::Omitted => Value::Omitted,
                item => Value::List(vec![item]),
            },
            _ => Value::Null,
        }
    }

    fn partial_record(&mut self, record: &RecordType, options: &PartialOptions, path: &str) -> Value {
        let mut fields = Vec::with_capacity(record.fields().len());
        for field in record.fields() {
            let field_path = child_path(path, &field.name);
            let value = if let Some(v) = lookup(&options.set_params, &field.name, &field_path) {
                v.clone()
            } else if self.visits_in_partial(field, options, &field_path) {
                self.partial_at(&field.ty, options, &field_path)
            } else {
                Value::Omitted
            };
            fields.push((field.name.clone(), value));
        }
        let record = Record::new(record.name(), fields);
        if record.all_omitted() {
            return Value::Omitted;
        }
        Value::Record(record)
    }

    // Unregistered record types are always walked so nested names can match.
    // A registered record type is a leaf and needs to be named explicitly.
    fn visits_in_partial(&self, field: &Field, options: &PartialOptions, path: &str) -> bool {
        if field.ty.is_record() && !self.hooks.contains_key(&field.ty) {
            return true;
        }
        names_field(&options.use_fields, &field.name, path)
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn names_field(list: &[String], name: &str, path: &str) -> bool {
    list.iter().any(|entry| entry == name || entry == path)
}

fn lookup<'p>(params: &'p Params, name: &str, path: &str) -> Option<&'p Value> {
    params.get(name).or_else(|| params.get(path))
}

fn default_hooks() -> Vec<(TypeDesc, Hook)> {
    vec![
        (
            TypeDesc::Primitive(Primitive::Bool),
            Hook::simple(|| Value::Bool(rand::rng().random_bool(0.5))),
        ),
        (
            TypeDesc::Primitive(Primitive::Int),
            Hook::simple(|| Value::Int(rand::rng().random_range(0..1000))),
        ),
        (
            TypeDesc::Primitive(Primitive::Float),
            Hook::simple(|| Value::Float(rand::rng().random::<f64>())),
        ),
        (
            TypeDesc::Primitive(Primitive::Str),
            Hook::simple(|| {
                let s: String = rand::rng()
                    .sample_iter(&Alphanumeric)
                    .take(10)
                    .map(char::from)
                    .collect();
                Value::Str(s)
            }),
        ),
        (
            TypeDesc::Primitive(Primitive::DateTime),
            Hook::simple(|| Value::DateTime(Utc::now().fixed_offset())),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use serde::Deserialize;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;

    fn child_type() -> TypeDesc {
        RecordType::new(
            "Child",
            [
                Field::new("value1", TypeDesc::INT),
                Field::new("value2", TypeDesc::list(TypeDesc::STR)),
                Field::with_default("value3", TypeDesc::tuple([TypeDesc::STR]), Value::Tuple(Vec::new())),
                Field::with_default("value4", TypeDesc::STR, Value::Null),
            ],
        )
        .into()
    }

    fn data_type() -> TypeDesc {
        RecordType::new(
            "Data",
            [
                Field::new("val1", TypeDesc::STR),
                Field::new("val2", child_type()),
                Field::with_default("val3", TypeDesc::STR, Value::Null),
            ],
        )
        .into()
    }

    fn child(value1: Value, value2: Value, value3: Value, value4: Value) -> Value {
        Value::record(
            "Child",
            [("value1", value1), ("value2", value2), ("value3", value3), ("value4", value4)],
        )
    }

    fn data(val1: Value, val2: Value, val3: Value) -> Value {
        Value::record("Data", [("val1", val1), ("val2", val2), ("val3", val3)])
    }

    fn test_list() -> Value {
        Value::List(vec!["test".into()])
    }

    fn test_tuple() -> Value {
        Value::Tuple(vec!["test".into()])
    }

    fn full_child() -> Value {
        child(Value::Int(50), test_list(), test_tuple(), "test".into())
    }

    fn random() -> Randomer {
        let mut randomer = Randomer::with_seed(7);
        randomer.add_type(TypeDesc::STR, Hook::constant("test"));
        randomer.add_type(TypeDesc::INT, Hook::constant(50));
        randomer
    }

    fn unstructured(value: &Value) -> serde_json::Value {
        Converter::new().unstructure(value)
    }

    #[derive(Clone, Default)]
    struct WarningCapture {
        warnings: Arc<Mutex<Vec<String>>>,
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarningCapture {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                let mut visitor = MessageVisitor(String::new());
                event.record(&mut visitor);
                self.warnings.lock().unwrap().push(visitor.0);
            }
        }
    }

    struct MessageVisitor(String);

    impl tracing::field::Visit for MessageVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    // --- registry ---

    #[test]
    fn add_type_registers_hook() {
        let mut randomer = Randomer::new();
        let hook = Hook::constant("test");
        randomer.add_type(TypeDesc::STR, hook.clone());
        assert_eq!(randomer.available_hooks().len(), 1);
        assert!(randomer.get_hook(&TypeDesc::STR).unwrap().ptr_eq(&hook));
        assert!(!hook.accepts_params());
        assert!(Hook::contextual(|_| Value::Null).accepts_params());
    }

    #[test]
    fn add_type_twice_warns_once_and_last_wins() {
        let capture = WarningCapture::default();
        let warnings = capture.warnings.clone();
        let subscriber = tracing_subscriber::registry().with(capture);

        let mut randomer = Randomer::new();
        let second = Hook::constant("second");
        tracing::subscriber::with_default(subscriber, || {
            randomer.add_type(TypeDesc::STR, Hook::constant("first"));
            randomer.add_type(TypeDesc::STR, second.clone());
        });

        let captured = warnings.lock().unwrap();
        assert_eq!(captured.len(), 1, "expected one warning, got: {:?}", *captured);
        assert!(captured[0].contains("overriding"));
        assert!(randomer.get_hook(&TypeDesc::STR).unwrap().ptr_eq(&second));
    }

    #[test]
    fn add_types_registers_all() {
        let mut randomer = Randomer::new();
        randomer.add_types([
            (TypeDesc::STR, Hook::constant("test")),
            (TypeDesc::INT, Hook::constant(1)),
        ]);
        assert_eq!(randomer.available_hooks().len(), 2);
    }

    #[test]
    fn add_types_warns_per_overwritten_key() {
        let capture = WarningCapture::default();
        let warnings = capture.warnings.clone();
        let subscriber = tracing_subscriber::registry().with(capture);

        let mut randomer = Randomer::new();
        let replacement = Hook::constant("second");
        tracing::subscriber::with_default(subscriber, || {
            randomer.add_type(TypeDesc::STR, Hook::constant("first"));
            randomer.add_types([(TypeDesc::STR, replacement.clone()), (TypeDesc::INT, Hook::constant(1))]);
        });

        let captured = warnings.lock().unwrap();
        assert_eq!(captured.len(), 1, "expected one warning, got: {:?}", *captured);
        assert!(randomer.get_hook(&TypeDesc::STR).unwrap().ptr_eq(&replacement));
        assert_eq!(randomer.available_hooks().len(), 2);
    }

    #[test]
    fn get_hook_missing_type() {
        let err = random().get_hook(&TypeDesc::list(TypeDesc::STR)).unwrap_err();
        assert!(matches!(err, RandomError::HookNotFound(_)));
    }

    #[test]
    fn run_hook_exists() {
        let value = random().run_hook(&TypeDesc::STR, &HookParams::default()).unwrap();
        assert_eq!(value, Value::from("test"));
    }

    #[test]
    fn run_hook_missing_type() {
        let err = random().run_hook(&TypeDesc::named("list"), &HookParams::default()).unwrap_err();
        assert!(matches!(err, RandomError::HookNotFound(_)));
    }

    #[test]
    fn run_hook_matches_exact_type_only() {
        let mut randomer = Randomer::new();
        randomer.add_type(TypeDesc::STR, Hook::constant("test"));
        randomer.add_type(TypeDesc::named("TypeStr"), Hook::constant("test2"));
        let params = HookParams::default();
        assert_eq!(randomer.run_hook(&TypeDesc::STR, &params).unwrap(), Value::from("test"));
        assert_eq!(
            randomer.run_hook(&TypeDesc::named("TypeStr"), &params).unwrap(),
            Value::from("test2")
        );
    }

    #[test]
    fn contextual_hook_receives_generation_params() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut randomer = random();
        randomer.add_type(
            TypeDesc::named("Tag"),
            Hook::contextual(move |params| {
                sink.lock().unwrap().push((params.ignore.to_vec(), params.inverse));
                params.param("tag").cloned().unwrap_or(Value::Null)
            }),
        );
        let ty: TypeDesc = RecordType::new("Tagged", [Field::new("label", TypeDesc::named("Tag"))]).into();

        let options = ObjectOptions::new().ignore(["other"]).inverse().set("tag", "blue");
        let value = randomer.random_object(&ty, &options).unwrap();

        // "label" is not listed and inverse is set, so the hook never runs for it.
        assert_eq!(value, Value::record("Tagged", [("label", Value::Null)]));
        assert!(seen.lock().unwrap().is_empty());

        let options = ObjectOptions::new().ignore(["label"]).inverse().set("tag", "blue");
        let value = randomer.random_object(&ty, &options).unwrap();
        assert_eq!(value, Value::record("Tagged", [("label", Value::from("blue"))]));
        assert_eq!(*seen.lock().unwrap(), vec![(vec!["label".to_string()], true)]);
    }

    // --- random_object ---

    #[test]
    fn random_object_child() {
        let value = random().object(&child_type(), &ObjectOptions::new()).unwrap();
        assert_eq!(value, full_child());
    }

    #[test]
    fn random_object_nested() {
        let value = random().object(&data_type(), &ObjectOptions::new()).unwrap();
        assert_eq!(value, data("test".into(), full_child(), "test".into()));
    }

    #[test]
    fn random_object_missing_type() {
        let value = random().object(&TypeDesc::named("dict"), &ObjectOptions::new()).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn random_object_unparameterized_containers() {
        let mut randomer = random();
        let options = ObjectOptions::new();
        assert_eq!(randomer.object(&TypeDesc::Tuple(Vec::new()), &options).unwrap(), Value::Null);
        assert_eq!(randomer.object(&TypeDesc::Union(Vec::new()), &options).unwrap(), Value::Null);
    }

    #[test]
    fn random_object_required_only() {
        let options = ObjectOptions::new().required_only();
        let mut randomer = random();
        let required_child = child(Value::Int(50), test_list(), Value::Tuple(Vec::new()), Value::Null);
        assert_eq!(randomer.object(&child_type(), &options).unwrap(), required_child);
        assert_eq!(
            randomer.object(&data_type(), &options).unwrap(),
            data("test".into(), required_child, Value::Null)
        );
    }

    #[test]
    fn random_object_ignore() {
        let mut randomer = random();

        let value = randomer.object(&child_type(), &ObjectOptions::new().ignore(["value1"])).unwrap();
        assert_eq!(value, child(Value::Null, test_list(), test_tuple(), "test".into()));

        let value = randomer.object(&data_type(), &ObjectOptions::new().ignore(["value1", "val1"])).unwrap();
        assert_eq!(
            value,
            data(
                Value::Null,
                child(Value::Null, test_list(), test_tuple(), "test".into()),
                "test".into()
            )
        );

        let value = randomer.object(&data_type(), &ObjectOptions::new().ignore(["value1", "val2"])).unwrap();
        assert_eq!(value, data("test".into(), Value::Null, "test".into()));
    }

    #[test]
    fn random_object_ignore_inverse() {
        let mut randomer = random();
        let sparse_child = child(Value::Int(50), Value::Null, Value::Tuple(Vec::new()), Value::Null);

        let value = randomer
            .object(&child_type(), &ObjectOptions::new().ignore(["value1"]).inverse())
            .unwrap();
        assert_eq!(value, sparse_child);

        let value = randomer
            .object(&data_type(), &ObjectOptions::new().ignore(["value1", "val1"]).inverse())
            .unwrap();
        assert_eq!(value, data("test".into(), Value::Null, Value::Null));

        let value = randomer
            .object(&data_type(), &ObjectOptions::new().ignore(["value1", "val2"]).inverse())
            .unwrap();
        assert_eq!(value, data(Value::Null, sparse_child, Value::Null));
    }

    #[test]
    fn only_equals_ignore_inverse() {
        let mut randomer = random();
        let only = randomer
            .object(&data_type(), &ObjectOptions::new().only(["value1", "val2"]))
            .unwrap();
        let inverse = randomer
            .object(&data_type(), &ObjectOptions::new().ignore(["value1", "val2"]).inverse())
            .unwrap();
        assert_eq!(only, inverse);
    }

    #[test]
    fn only_and_ignore_conflict() {
        let options = ObjectOptions::new().only(["val1"]).ignore(["val2"]);
        let err = random().object(&data_type(), &options).unwrap_err();
        assert!(matches!(err, RandomError::ConflictingFilters));
    }

    #[test]
    fn random_object_set_params() {
        let mut randomer = random();

        let value = randomer.object(&child_type(), &ObjectOptions::new().set("value1", 560)).unwrap();
        assert_eq!(value, child(Value::Int(560), test_list(), test_tuple(), "test".into()));

        let options = ObjectOptions::new().set("value1", 560).set("val1", "rest");
        let value = randomer.object(&data_type(), &options).unwrap();
        assert_eq!(
            value,
            data(
                "rest".into(),
                child(Value::Int(560), test_list(), test_tuple(), "test".into()),
                "test".into()
            )
        );
    }

    #[test]
    fn set_params_beat_filters_and_defaults() {
        let options = ObjectOptions::new()
            .required_only()
            .ignore(["value1"])
            .set("value1", 7)
            .set("value4", "forced");
        let value = random().object(&child_type(), &options).unwrap();
        assert_eq!(
            value,
            child(Value::Int(7), test_list(), Value::Tuple(Vec::new()), "forced".into())
        );
    }

    #[test]
    fn set_params_beat_only_and_inverse() {
        let options = ObjectOptions::new().only(["val1"]).set("val3", "x");
        let value = random().object(&data_type(), &options).unwrap();
        assert_eq!(value, data("test".into(), Value::Null, "x".into()));

        let options = ObjectOptions::new().ignore(["val1"]).inverse().set("val2", "forced");
        let value = random().object(&data_type(), &options).unwrap();
        assert_eq!(value, data("test".into(), "forced".into(), Value::Null));
    }

    #[test]
    fn dotted_paths_address_nested_fields() {
        let options = ObjectOptions::new().ignore(["val2.value2"]).set("val2.value1", 1);
        let value = random().object(&data_type(), &options).unwrap();
        assert_eq!(
            value,
            data(
                "test".into(),
                child(Value::Int(1), Value::Null, test_tuple(), "test".into()),
                "test".into()
            )
        );
    }

    #[test]
    fn union_alternatives_are_all_reachable() {
        let ty = TypeDesc::union([TypeDesc::INT, TypeDesc::STR, TypeDesc::Null]);
        let mut randomer = random();
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let value = randomer.object(&ty, &ObjectOptions::new()).unwrap();
            seen.insert(value.kind());
        }
        assert_eq!(seen, HashSet::from(["int", "str", "null"]));
    }

    #[test]
    fn seeded_union_choice_is_reproducible() {
        let ty = TypeDesc::list(TypeDesc::union([TypeDesc::INT, TypeDesc::STR]));
        let draws = |seed| {
            let mut randomer = Randomer::with_seed(seed);
            randomer.add_type(TypeDesc::STR, Hook::constant("test"));
            randomer.add_type(TypeDesc::INT, Hook::constant(50));
            (0..20)
                .map(|_| randomer.object(&ty, &ObjectOptions::new()).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(42), draws(42));
    }

    #[test]
    fn registered_record_short_circuits() {
        let mut randomer = random();
        randomer.add_type(child_type(), Hook::constant("child"));
        let value = randomer.object(&data_type(), &ObjectOptions::new()).unwrap();
        assert_eq!(value, data("test".into(), "child".into(), "test".into()));
    }

    // --- random_partial ---

    #[test]
    fn random_partial_single_fields() {
        let mut randomer = random();
        let cases = [
            ("value1", json!({"value1": 50})),
            ("value2", json!({"value2": ["test"]})),
            ("value3", json!({"value3": ["test"]})),
            ("value4", json!({"value4": "test"})),
        ];
        for (field, expected) in cases {
            let value = randomer.partial(&child_type(), &PartialOptions::new().use_fields([field]));
            assert_eq!(unstructured(&value), expected, "use={field}");
        }
    }

    #[test]
    fn random_partial_nested() {
        let mut randomer = random();

        let value = randomer.partial(&data_type(), &PartialOptions::new().use_fields(["val1"]));
        assert_eq!(value.as_record().and_then(|r| r.get("val2")), Some(&Value::Omitted));
        assert_eq!(unstructured(&value), json!({"val1": "test"}));

        let value = randomer.partial(&data_type(), &PartialOptions::new().use_fields(["val1", "value2"]));
        assert_eq!(unstructured(&value), json!({"val1": "test", "val2": {"value2": ["test"]}}));
    }

    #[test]
    fn random_partial_dotted_path() {
        let value = random().partial(&data_type(), &PartialOptions::new().use_fields(["val2.value1"]));
        assert_eq!(unstructured(&value), json!({"val2": {"value1": 50}}));
    }

    #[test]
    fn random_partial_nothing_requested_collapses() {
        let mut randomer = random();
        assert_eq!(randomer.partial(&child_type(), &PartialOptions::new()), Value::Omitted);
        assert_eq!(randomer.partial(&data_type(), &PartialOptions::new()), Value::Omitted);
    }

    #[test]
    fn random_partial_missing_type() {
        let value = random().partial(&TypeDesc::named("dict"), &PartialOptions::new());
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn random_partial_set_params() {
        let mut randomer = random();

        let options = PartialOptions::new().use_fields(["value1"]).set("value2", "rest");
        let value = randomer.partial(&child_type(), &options);
        assert_eq!(unstructured(&value), json!({"value1": 50, "value2": "rest"}));

        let options = PartialOptions::new().use_fields(["val1"]).set("value2", "rest");
        let value = randomer.partial(&data_type(), &options);
        assert_eq!(unstructured(&value), json!({"val1": "test", "val2": {"value2": "rest"}}));
    }

    #[test]
    fn random_partial_registered_record_is_a_leaf() {
        let mut randomer = random();
        randomer.add_type(child_type(), Hook::constant("child"));

        // The nested name no longer reaches into Child.
        let value = randomer.partial(&data_type(), &PartialOptions::new().use_fields(["value1"]));
        assert_eq!(value, Value::Omitted);

        let value = randomer.partial(&data_type(), &PartialOptions::new().use_fields(["val2"]));
        assert_eq!(unstructured(&value), json!({"val2": "child"}));
    }

    #[test]
    fn random_partial_forwards_use_fields_to_hooks() {
        let mut randomer = random();
        randomer.add_type(
            TypeDesc::named("Echo"),
            Hook::contextual(|params| Value::List(params.use_fields.iter().cloned().map(Value::Str).collect())),
        );
        let ty: TypeDesc = RecordType::new("Holder", [Field::new("echo", TypeDesc::named("Echo"))]).into();
        let value = randomer.partial(&ty, &PartialOptions::new().use_fields(["echo"]));
        assert_eq!(unstructured(&value), json!({"echo": ["echo"]}));
    }

    #[test]
    fn random_partial_collapsed_elements_collapse_their_container() {
        let holder: TypeDesc = RecordType::new(
            "Holder",
            [
                Field::new("name", TypeDesc::STR),
                Field::new("items", TypeDesc::list(child_type())),
                Field::new("pair", TypeDesc::tuple([child_type()])),
            ],
        )
        .into();
        let mut randomer = random();

        let value = randomer.partial(&holder, &PartialOptions::new().use_fields(["items"]));
        assert_eq!(value, Value::Omitted);

        let value = randomer.partial(&holder, &PartialOptions::new().use_fields(["name", "items", "pair"]));
        assert_eq!(unstructured(&value), json!({"name": "test"}));

        let value = randomer.partial(&holder, &PartialOptions::new().use_fields(["items", "value1"]));
        assert_eq!(unstructured(&value), json!({"items": [{"value1": 50}]}));
    }

    // --- typed generation ---

    #[derive(Debug, Deserialize, PartialEq)]
    struct Profile {
        name: String,
        age: i64,
        tags: Vec<String>,
        nickname: Option<String>,
    }

    impl Describe for Profile {
        fn describe() -> TypeDesc {
            RecordType::new(
                "Profile",
                [
                    Field::new("name", String::describe()),
                    Field::new("age", i64::describe()),
                    Field::new("tags", <Vec<String>>::describe()),
                    Field::with_default("nickname", <Option<String>>::describe(), Value::Null),
                ],
            )
            .into()
        }
    }

    #[test]
    fn generate_typed_struct() {
        let profile: Profile = random().generate(&ObjectOptions::new().required_only()).unwrap();
        assert_eq!(
            profile,
            Profile {
                name: "test".to_string(),
                age: 50,
                tags: vec!["test".to_string()],
                nickname: None,
            }
        );
    }

    #[test]
    fn with_defaults_covers_primitives() {
        let mut randomer = Randomer::with_defaults();
        let profile: Profile = randomer.generate(&ObjectOptions::new()).unwrap();
        assert_eq!(profile.name.len(), 10);
        assert!((0..1000).contains(&profile.age));
        assert_eq!(profile.tags.len(), 1);
    }
}
