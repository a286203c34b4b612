//! The mapping engine: typed transformation rules compiled at startup.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use thiserror::Error;

use crate::filter::FilterExpr;

/// Mapping configuration/runtime error. Configuration variants are raised at
/// startup and abort process bring-up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A rule for the same source/destination pair was registered twice.
    #[error("mapping rule already registered: {source_name} -> {dest_name}")]
    DuplicateRule {
        source_name: &'static str,
        dest_name: &'static str,
    },

    /// No rule exists for the requested source/destination pair.
    #[error("no mapping rule for {source_name} -> {dest_name}")]
    MissingRule {
        source_name: &'static str,
        dest_name: &'static str,
    },

    /// Filter mapping was requested but the extension was not enabled.
    #[error("expression mapping is not enabled")]
    ExpressionMappingDisabled,

    /// A filter references a field the rule has no correspondence for.
    #[error("no field correspondence for '{field}' in rule {source_name} -> {dest_name}")]
    UnknownField {
        field: String,
        source_name: &'static str,
        dest_name: &'static str,
    },
}

struct RuleEntry {
    source_name: &'static str,
    dest_name: &'static str,
    /// Holds a `fn(&S) -> D`, downcast again at the typed call site.
    transform: Box<dyn Any + Send + Sync>,
    /// Source field name → destination field name, for filter rewriting.
    fields: &'static [(&'static str, &'static str)],
}

/// Collects mapping rules; duplicate registrations fail immediately so bad
/// configurations never survive startup.
pub struct MapperBuilder {
    rules: HashMap<(TypeId, TypeId), RuleEntry>,
    expression_mapping: bool,
}

impl MapperBuilder {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            expression_mapping: false,
        }
    }

    /// Enable the filter/query expression transformation extension.
    pub fn with_expression_mapping(mut self) -> Self {
        self.expression_mapping = true;
        self
    }

    /// Register a transformation rule from `S` to `D`.
    pub fn rule<S, D>(&mut self, transform: fn(&S) -> D) -> Result<(), MappingError>
    where
        S: 'static,
        D: 'static,
    {
        self.rule_with_fields(transform, &[])
    }

    /// Register a rule plus the field correspondences (source field,
    /// destination field) used when rewriting filter expressions from `D`'s
    /// shape back to `S`'s.
    pub fn rule_with_fields<S, D>(
        &mut self,
        transform: fn(&S) -> D,
        fields: &'static [(&'static str, &'static str)],
    ) -> Result<(), MappingError>
    where
        S: 'static,
        D: 'static,
    {
        let key = (TypeId::of::<S>(), TypeId::of::<D>());
        let source_name = core::any::type_name::<S>();
        let dest_name = core::any::type_name::<D>();

        if self.rules.contains_key(&key) {
            return Err(MappingError::DuplicateRule {
                source_name,
                dest_name,
            });
        }

        self.rules.insert(
            key,
            RuleEntry {
                source_name,
                dest_name,
                transform: Box::new(transform),
                fields,
            },
        );
        Ok(())
    }

    pub fn build(self) -> Mapper {
        Mapper {
            rules: self.rules,
            expression_mapping: self.expression_mapping,
        }
    }
}

impl Default for MapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The compiled, shared mapping engine. Immutable after startup.
pub struct Mapper {
    rules: HashMap<(TypeId, TypeId), RuleEntry>,
    expression_mapping: bool,
}

impl core::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mapper")
            .field("rules", &self.rules.len())
            .field("expression_mapping", &self.expression_mapping)
            .finish()
    }
}

impl Mapper {
    /// Transform `value` through the registered `S -> D` rule.
    pub fn map<S, D>(&self, value: &S) -> Result<D, MappingError>
    where
        S: 'static,
        D: 'static,
    {
        let entry = self.rule_entry::<S, D>()?;
        let transform = entry
            .transform
            .downcast_ref::<fn(&S) -> D>()
            // Unreachable by construction: entries are keyed by (S, D).
            .ok_or(MappingError::MissingRule {
                source_name: entry.source_name,
                dest_name: entry.dest_name,
            })?;
        Ok(transform(value))
    }

    pub fn expression_mapping_enabled(&self) -> bool {
        self.expression_mapping
    }

    /// Rewrite a filter written against `D`'s field names into `S`'s, using
    /// the rule's field correspondences. Queries arrive shaped like the
    /// mapped destination (the wire shape) and storage wants the source
    /// shape. Requires the extension.
    pub fn map_filter<S, D>(&self, filter: &FilterExpr) -> Result<FilterExpr, MappingError>
    where
        S: 'static,
        D: 'static,
    {
        if !self.expression_mapping {
            return Err(MappingError::ExpressionMappingDisabled);
        }

        let entry = self.rule_entry::<S, D>()?;
        rewrite(filter, entry)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn rule_entry<S: 'static, D: 'static>(&self) -> Result<&RuleEntry, MappingError> {
        let key = (TypeId::of::<S>(), TypeId::of::<D>());
        self.rules.get(&key).ok_or(MappingError::MissingRule {
            source_name: core::any::type_name::<S>(),
            dest_name: core::any::type_name::<D>(),
        })
    }
}

fn rewrite(filter: &FilterExpr, entry: &RuleEntry) -> Result<FilterExpr, MappingError> {
    match filter {
        FilterExpr::Compare { field, op, value } => {
            let mapped = entry
                .fields
                .iter()
                .find(|(_, dest)| *dest == field.as_str())
                .map(|(source, _)| *source)
                .ok_or_else(|| MappingError::UnknownField {
                    field: field.clone(),
                    source_name: entry.source_name,
                    dest_name: entry.dest_name,
                })?;
            Ok(FilterExpr::Compare {
                field: mapped.to_string(),
                op: *op,
                value: value.clone(),
            })
        }
        FilterExpr::And(parts) => Ok(FilterExpr::And(
            parts
                .iter()
                .map(|p| rewrite(p, entry))
                .collect::<Result<_, _>>()?,
        )),
        FilterExpr::Or(parts) => Ok(FilterExpr::Or(
            parts
                .iter()
                .map(|p| rewrite(p, entry))
                .collect::<Result<_, _>>()?,
        )),
        FilterExpr::Not(inner) => Ok(FilterExpr::Not(Box::new(rewrite(inner, entry)?))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::CompareOp;
    use serde_json::json;

    struct Order {
        reference: String,
        total_cents: i64,
    }

    struct OrderView {
        reference: String,
        total_cents: i64,
    }

    fn order_to_view(order: &Order) -> OrderView {
        OrderView {
            reference: order.reference.clone(),
            total_cents: order.total_cents,
        }
    }

    const ORDER_FIELDS: &[(&str, &str)] = &[
        ("reference", "reference"),
        ("total_cents", "totalCents"),
    ];

    fn mapper() -> Mapper {
        let mut builder = MapperBuilder::new().with_expression_mapping();
        builder
            .rule_with_fields::<Order, OrderView>(order_to_view, ORDER_FIELDS)
            .unwrap();
        builder.build()
    }

    #[test]
    fn maps_values_through_registered_rule() {
        let view: OrderView = mapper()
            .map(&Order {
                reference: "A-17".to_string(),
                total_cents: 995,
            })
            .unwrap();

        assert_eq!(view.reference, "A-17");
        assert_eq!(view.total_cents, 995);
    }

    #[test]
    fn missing_rule_is_an_error() {
        let err = mapper().map::<OrderView, Order>(&OrderView {
            reference: String::new(),
            total_cents: 0,
        });
        assert!(matches!(err, Err(MappingError::MissingRule { .. })));
    }

    #[test]
    fn duplicate_rule_fails_at_registration() {
        let mut builder = MapperBuilder::new();
        builder.rule::<Order, OrderView>(order_to_view).unwrap();
        let err = builder.rule::<Order, OrderView>(order_to_view).unwrap_err();
        assert!(matches!(err, MappingError::DuplicateRule { .. }));
    }

    #[test]
    fn filter_fields_are_rewritten() {
        let filter = FilterExpr::And(vec![
            FilterExpr::eq("reference", json!("A-17")),
            FilterExpr::Compare {
                field: "totalCents".to_string(),
                op: CompareOp::Gt,
                value: json!(500),
            },
        ]);

        let mapped = mapper().map_filter::<Order, OrderView>(&filter).unwrap();

        let FilterExpr::And(parts) = mapped else {
            panic!("expected And");
        };
        let FilterExpr::Compare { field, .. } = &parts[1] else {
            panic!("expected Compare");
        };
        assert_eq!(field, "total_cents");
    }

    #[test]
    fn unknown_filter_field_is_an_error() {
        let filter = FilterExpr::eq("nope", json!(1));
        let err = mapper()
            .map_filter::<Order, OrderView>(&filter)
            .unwrap_err();
        assert!(matches!(err, MappingError::UnknownField { .. }));
    }

    #[test]
    fn filter_mapping_requires_the_extension() {
        let mut builder = MapperBuilder::new();
        builder
            .rule_with_fields::<Order, OrderView>(order_to_view, ORDER_FIELDS)
            .unwrap();
        let plain = builder.build();

        let err = plain
            .map_filter::<Order, OrderView>(&FilterExpr::eq("reference", json!("x")))
            .unwrap_err();
        assert_eq!(err, MappingError::ExpressionMappingDisabled);
    }
}
