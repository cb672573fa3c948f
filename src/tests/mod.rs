//! 单元测试模块
//! 覆盖表达式、布局树、事件、数据源、级联、渲染器与容器布局

mod support;

pub mod renderer_tests;
