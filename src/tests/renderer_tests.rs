//! 渲染器单元测试
//! 测试挂载、注册表、重复渲染、卸载与事件派发

use super::support::{init_logger, mock_components, new_log, ManualTransport};
use crate::error::RenderError;
use crate::event::{HandlerTable, NativeEvent};
use crate::expr::ExpressionResolver;
use crate::renderer::{LayoutRenderer, RenderedNode};
use crate::schema::{LayoutNode, Orientation};
use crate::value::ResolvedArgs;
use serde_json::{json, Value as JsonValue};
use std::cell::RefCell;
use std::rc::Rc;

/// 典型页面：表格 + 表单 + 按钮
fn dashboard() -> LayoutNode {
    LayoutNode::from_value(json!({
        "type": "container",
        "layout": "vertical",
        "children": [
            {
                "type": "container",
                "layout": "grid",
                "gridTemplate": { "columns": "1fr 1fr" },
                "children": [
                    {
                        "type": "component",
                        "component": "Grid",
                        "id": "mainGrid",
                        "props": { "selected": [{ "id": 1 }, { "id": 2 }] },
                        "dataSource": { "endpoint": "/users" }
                    },
                    {
                        "type": "component",
                        "component": "Form",
                        "id": "filter",
                        "props": { "value": "sales" }
                    }
                ]
            },
            {
                "type": "component",
                "component": "Button",
                "id": "deleteBtn",
                "class": "danger",
                "events": {
                    "click": {
                        "handler": "handleButtonClick",
                        "args": { "action": "delete", "rows": "$mainGrid.getSelectedRowsData()" }
                    }
                }
            }
        ]
    }))
    .unwrap()
}

/// 所有声明的 id 都已注册
#[test]
fn test_registry_completeness() {
    init_logger();
    let log = new_log();
    let mut renderer = LayoutRenderer::new(mock_components(&log), ManualTransport::new());
    let tree = renderer.render(&dashboard(), HandlerTable::new()).unwrap();

    let ids: Vec<Option<&str>> = tree.widgets().iter().map(|w| w.id.as_deref()).collect();
    assert_eq!(ids, vec![Some("mainGrid"), Some("filter"), Some("deleteBtn")]);

    assert_eq!(renderer.registry().ids(), vec!["deleteBtn", "filter", "mainGrid"]);
    assert_eq!(renderer.mounted_count(), 3);

    // 属性在构造时传入
    let resolver = ExpressionResolver::new(renderer.registry());
    assert_eq!(resolver.evaluate("$filter.getValue()").into_json(), Some(json!("sales")));
}

/// 渲染结果保留容器结构
#[test]
fn test_rendered_structure() {
    let log = new_log();
    let mut renderer = LayoutRenderer::new(mock_components(&log), ManualTransport::new());
    renderer.render(&dashboard(), HandlerTable::new()).unwrap();

    let Some(RenderedNode::Container(root)) = renderer.tree().root() else {
        panic!("root should be a container");
    };
    assert_eq!(root.orientation, Orientation::Vertical);
    assert_eq!(root.children.len(), 2);
    let RenderedNode::Container(grid) = &root.children[0] else {
        panic!("first child should be the grid container");
    };
    assert_eq!(grid.orientation, Orientation::Grid);
    assert_eq!(grid.layout.grid_template_columns.len(), 2);

    let button = renderer.tree().find_by_id("deleteBtn").unwrap();
    assert_eq!(button.component, "Button");
    assert_eq!(button.classes, vec!["danger"]);
    assert_eq!(renderer.tree().find_by_key(button.key).map(|w| w.component.as_str()), Some("Button"));
}

/// 点击按钮：处理函数收到字面量与表达式混合参数
#[test]
fn test_fire_event_with_mixed_args() {
    init_logger();
    let log = new_log();
    let received: Rc<RefCell<Vec<(String, JsonValue, JsonValue)>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = received.clone();
    let handlers = HandlerTable::new().with("handleButtonClick", move |event: &NativeEvent, args: &ResolvedArgs| {
        sink.borrow_mut().push((
            event.source_id.clone().unwrap_or_default(),
            args["action"].as_json().cloned().unwrap_or(JsonValue::Null),
            args["rows"].as_json().cloned().unwrap_or(JsonValue::Null),
        ));
    });

    let mut renderer = LayoutRenderer::new(mock_components(&log), ManualTransport::new());
    renderer.render(&dashboard(), handlers).unwrap();

    assert!(renderer.fire_event_by_id("deleteBtn", "click", JsonValue::Null));
    // 没有绑定的事件
    assert!(!renderer.fire_event_by_id("deleteBtn", "hover", JsonValue::Null));

    let received = received.borrow();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, "deleteBtn");
    assert_eq!(received[0].1, json!("delete"));
    assert_eq!(received[0].2, json!([{ "id": 1 }, { "id": 2 }]));
}

/// 未注册的组件被跳过，其余照常渲染
#[test]
fn test_unknown_component_skipped() {
    init_logger();
    let log = new_log();
    let mut renderer = LayoutRenderer::new(mock_components(&log), ManualTransport::new());
    let tree = LayoutNode::from_value(json!({
        "type": "container",
        "children": [
            { "type": "component", "component": "Grid", "id": "a" },
            { "type": "component", "component": "Chart", "id": "chart" },
            { "type": "component", "component": "Form", "id": "b" }
        ]
    }))
    .unwrap();

    let rendered = renderer.render(&tree, HandlerTable::new()).unwrap();
    assert_eq!(rendered.widgets().len(), 2);
    assert!(!renderer.registry().contains("chart"));
    assert_eq!(renderer.registry().ids(), vec!["a", "b"]);
}

/// 重复 id 拒绝构建，已挂载的树保持不变
#[test]
fn test_duplicate_id_rejected() {
    init_logger();
    let log = new_log();
    let mut renderer = LayoutRenderer::new(mock_components(&log), ManualTransport::new());
    renderer.render(&dashboard(), HandlerTable::new()).unwrap();

    let bad = LayoutNode::from_value(json!({
        "type": "container",
        "children": [
            { "type": "component", "component": "Grid", "id": "x" },
            { "type": "component", "component": "Grid", "id": "x" }
        ]
    }))
    .unwrap();

    let err = renderer.render(&bad, HandlerTable::new()).unwrap_err();
    assert_eq!(err, RenderError::DuplicateId("x".to_string()));
    assert_eq!(renderer.registry().ids(), vec!["deleteBtn", "filter", "mainGrid"]);
    assert!(!renderer.registry().contains("x"));
}

/// 同一棵树渲染两次结果一致，实例是新建的
#[test]
fn test_rerender_is_idempotent() {
    init_logger();
    let log = new_log();
    let transport = ManualTransport::new();
    let mut renderer = LayoutRenderer::new(mock_components(&log), transport.clone());

    renderer.render(&dashboard(), HandlerTable::new()).unwrap();
    let first_ids: Vec<String> = renderer.registry().ids().into_iter().map(String::from).collect();
    let first_grid = renderer.registry().handle("mainGrid").unwrap();
    let first_jobs = transport.take_jobs();

    renderer.render(&dashboard(), HandlerTable::new()).unwrap();
    let second_ids: Vec<String> = renderer.registry().ids().into_iter().map(String::from).collect();
    let second_grid = renderer.registry().handle("mainGrid").unwrap();

    assert_eq!(first_ids, second_ids);
    assert_eq!(renderer.mounted_count(), 3);
    assert!(!Rc::ptr_eq(&first_grid, &second_grid));

    // 上一棵树的请求结果不会落到新树上
    for job in first_jobs {
        job.complete(Ok(json!([{ "id": "old" }])));
    }
    assert_eq!(renderer.pump(), 0);
    assert_eq!(transport.pending(), 1);
}

/// 卸载单个组件后注册表、事件、数据源全部清理
#[test]
fn test_unmount_cleans_up() {
    init_logger();
    let log = new_log();
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    let handlers = HandlerTable::new().with("handleButtonClick", move |_: &NativeEvent, _: &ResolvedArgs| {
        *counter.borrow_mut() += 1;
    });

    let mut renderer = LayoutRenderer::new(mock_components(&log), ManualTransport::new());
    renderer.render(&dashboard(), handlers).unwrap();
    let button_key = renderer.registry().key_of("deleteBtn").unwrap();

    assert!(renderer.unmount("deleteBtn"));
    assert!(!renderer.unmount("deleteBtn"));

    assert!(!renderer.registry().contains("deleteBtn"));
    assert!(renderer.tree().find_by_id("deleteBtn").is_none());
    assert_eq!(renderer.mounted_count(), 2);
    assert!(!renderer.fire_event_by_id("deleteBtn", "click", JsonValue::Null));
    assert!(!renderer.fire_event(button_key, "click", JsonValue::Null));
    assert_eq!(*calls.borrow(), 0);

    // 引用已卸载组件的表达式得到 Undefined
    let resolver = ExpressionResolver::new(renderer.registry());
    assert!(resolver.evaluate("$deleteBtn").is_undefined());
}

/// 卸载级联子节点后父事件不再触发请求
#[test]
fn test_unmount_removes_cascade_subscription() {
    init_logger();
    let log = new_log();
    let transport = ManualTransport::new();
    let mut renderer = LayoutRenderer::new(mock_components(&log), transport.clone());
    let tree = LayoutNode::from_value(json!({
        "type": "container",
        "children": [
            { "type": "component", "component": "Grid", "id": "users" },
            { "type": "component", "component": "Grid", "id": "orders", "cascade": {
                "parentComponent": "users",
                "parentEvent": "selectionChanged",
                "endpointTemplate": "/users/{id}/orders",
                "parentKeyField": "id"
            }}
        ]
    }))
    .unwrap();
    renderer.render(&tree, HandlerTable::new()).unwrap();

    assert!(renderer.unmount("orders"));
    renderer.fire_event_by_id("users", "selectionChanged", json!({ "id": 7 }));
    assert_eq!(transport.pending(), 0);
}

/// 卸载整棵树
#[test]
fn test_teardown() {
    let log = new_log();
    let mut renderer = LayoutRenderer::new(mock_components(&log), ManualTransport::new());
    renderer.render(&dashboard(), HandlerTable::new()).unwrap();

    renderer.teardown();
    assert!(renderer.registry().is_empty());
    assert!(renderer.tree().is_empty());
    assert_eq!(renderer.mounted_count(), 0);
    assert_eq!(renderer.fetch_state("mainGrid"), None);
    assert_eq!(renderer.pump(), 0);
}

/// 根节点本身是组件时卸载后树为空
#[test]
fn test_unmount_root_widget() {
    let log = new_log();
    let mut renderer = LayoutRenderer::new(mock_components(&log), ManualTransport::new());
    let tree = LayoutNode::from_value(json!({ "type": "component", "component": "Form", "id": "only" })).unwrap();
    renderer.render(&tree, HandlerTable::new()).unwrap();

    assert!(!renderer.tree().is_empty());
    assert!(renderer.unmount("only"));
    assert!(renderer.tree().is_empty());
}

/// 没有 id 的组件按节点键刷新与卸载
#[test]
fn test_refresh_and_unmount_by_key() {
    init_logger();
    let log = new_log();
    let transport = ManualTransport::new();
    let mut renderer = LayoutRenderer::new(mock_components(&log), transport.clone());
    let tree = LayoutNode::from_value(json!({
        "type": "container",
        "children": [
            { "type": "component", "component": "Grid", "dataSource": { "endpoint": "/users" } },
            { "type": "component", "component": "Form", "id": "filter" }
        ]
    }))
    .unwrap();
    renderer.render(&tree, HandlerTable::new()).unwrap();

    let anonymous = renderer.tree().widgets()[0].key;
    assert!(renderer.tree().widgets()[0].id.is_none());
    assert_eq!(transport.pending(), 1);

    assert!(renderer.refresh_key(anonymous));
    assert_eq!(transport.pending(), 2);

    assert!(renderer.unmount_key(anonymous));
    assert!(!renderer.unmount_key(anonymous));
    assert!(!renderer.refresh_key(anonymous));
    assert_eq!(renderer.mounted_count(), 1);
    assert_eq!(renderer.tree().widgets().len(), 1);
    assert_eq!(renderer.fetch_state_of(anonymous), None);

    // 请求结果不会落到已卸载的组件上
    for job in transport.take_jobs() {
        job.complete(Ok(json!([{ "id": 1 }])));
    }
    assert_eq!(renderer.pump(), 0);

    // 有 id 的组件按键卸载时同时从注册表移除
    let filter = renderer.registry().key_of("filter").unwrap();
    assert!(renderer.unmount_key(filter));
    assert!(!renderer.registry().contains("filter"));
    assert!(renderer.tree().widgets().is_empty());
}
