//! 构建前校验
//!
//! 重复 id 与级联环会让整棵树拒绝挂载；其余问题只产生警告。

use super::data_spec::DataSpec;
use super::node::{LayoutNode, WidgetNode};
use crate::error::RenderError;
use crate::expr::Expression;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// 配置警告
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    MalformedExpression { component: String, expression: String, message: String },
    UnknownReference { component: String, target: String },
    MissingPlaceholder { component: String, template: String, placeholder: String },
    InlineDataOnCascade { component: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::MalformedExpression { component, expression, message } => {
                write!(f, "component \"{}\": malformed expression \"{}\": {}", component, expression, message)
            }
            ConfigWarning::UnknownReference { component, target } => {
                write!(f, "component \"{}\" references unknown id \"{}\"", component, target)
            }
            ConfigWarning::MissingPlaceholder { component, template, placeholder } => {
                write!(f, "component \"{}\": endpoint template \"{}\" has no {} placeholder", component, template, placeholder)
            }
            ConfigWarning::InlineDataOnCascade { component } => {
                write!(f, "component \"{}\": inline data is ignored on a cascade child", component)
            }
        }
    }
}

/// 校验布局树
pub fn validate(tree: &LayoutNode) -> Result<Vec<ConfigWarning>, RenderError> {
    let widgets = tree.widgets();

    let mut declared: HashSet<&str> = HashSet::new();
    for widget in &widgets {
        if let Some(id) = widget.id.as_deref() {
            if !declared.insert(id) {
                return Err(RenderError::DuplicateId(id.to_string()));
            }
        }
    }

    check_cascade_cycles(&widgets)?;

    let mut warnings = Vec::new();
    for widget in &widgets {
        check_widget(widget, &declared, &mut warnings);
    }
    Ok(warnings)
}

fn check_widget(widget: &WidgetNode, declared: &HashSet<&str>, warnings: &mut Vec<ConfigWarning>) {
    let mut expressions: Vec<&str> = Vec::new();
    for binding in widget.events.values() {
        expressions.extend(binding.args.values().filter_map(|value| value.as_expression()));
    }
    if let Some(DataSpec::Remote(remote)) = &widget.data_source {
        expressions.extend(remote.expressions());
    }

    if let Some(selection) = widget.cascade.as_ref().and_then(|cascade| cascade.selection.as_deref()) {
        expressions.push(selection);
    }

    for source in expressions {
        match Expression::parse(source) {
            Ok(expression) => {
                if !declared.contains(expression.target.as_str()) {
                    warnings.push(ConfigWarning::UnknownReference {
                        component: widget.component.clone(),
                        target: expression.target,
                    });
                }
            }
            Err(err) => warnings.push(ConfigWarning::MalformedExpression {
                component: widget.component.clone(),
                expression: source.to_string(),
                message: err.to_string(),
            }),
        }
    }

    if let Some(cascade) = &widget.cascade {
        if !declared.contains(cascade.parent_id.as_str()) {
            warnings.push(ConfigWarning::UnknownReference {
                component: widget.component.clone(),
                target: cascade.parent_id.clone(),
            });
        }
        let placeholder = cascade.placeholder();
        if !cascade.endpoint_template.contains(&placeholder) {
            warnings.push(ConfigWarning::MissingPlaceholder {
                component: widget.component.clone(),
                template: cascade.endpoint_template.clone(),
                placeholder,
            });
        }
        if matches!(widget.data_source, Some(DataSpec::Inline(_))) {
            warnings.push(ConfigWarning::InlineDataOnCascade { component: widget.component.clone() });
        }
    }
}

/// 级联依赖图必须无环（子 -> 父）
fn check_cascade_cycles(widgets: &[&WidgetNode]) -> Result<(), RenderError> {
    let edges: HashMap<&str, &str> = widgets
        .iter()
        .filter_map(|widget| {
            let id = widget.id.as_deref()?;
            let cascade = widget.cascade.as_ref()?;
            Some((id, cascade.parent_id.as_str()))
        })
        .collect();

    let mut finished: HashSet<&str> = HashSet::new();
    for start in widgets.iter().filter_map(|widget| widget.id.as_deref()) {
        if finished.contains(start) {
            continue;
        }
        // 每个节点最多一条出边，沿链走即可
        let mut path: Vec<&str> = Vec::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if finished.contains(id) {
                break;
            }
            if let Some(pos) = path.iter().position(|seen| *seen == id) {
                let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
                cycle.push(id.to_string());
                return Err(RenderError::CascadeCycle(cycle));
            }
            path.push(id);
            current = edges.get(id).copied();
        }
        finished.extend(path);
    }
    Ok(())
}
