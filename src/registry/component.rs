//! 组件注册表 - 组件名到构造器的静态映射

use crate::widget::{InstanceHandle, Widget, WidgetProps};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// 组件构造器
pub type Constructor = Box<dyn Fn(&WidgetProps) -> InstanceHandle>;

/// 按名字查找构造器
pub trait ComponentLookup {
    fn lookup(&self, name: &str) -> Option<&Constructor>;
}

/// 组件注册表
#[derive(Default)]
pub struct ComponentRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册组件，同名时覆盖
    pub fn register<W, F>(&mut self, name: &str, build: F)
    where
        W: Widget + 'static,
        F: Fn(&WidgetProps) -> W + 'static,
    {
        let constructor: Constructor = Box::new(move |props| {
            let handle: InstanceHandle = Rc::new(RefCell::new(build(props)));
            handle
        });
        self.constructors.insert(name.to_string(), constructor);
    }

    pub fn with<W, F>(mut self, name: &str, build: F) -> Self
    where
        W: Widget + 'static,
        F: Fn(&WidgetProps) -> W + 'static,
    {
        self.register(name, build);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl ComponentLookup for ComponentRegistry {
    fn lookup(&self, name: &str) -> Option<&Constructor> {
        self.constructors.get(name)
    }
}
