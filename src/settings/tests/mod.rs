#[cfg(test)]
mod controller_tests;

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{
    ActionProvider, CommandBindings, CommandCatalog, CommandDefinition, CommandParameter,
    NoActions,
};

/// Helper: small shared catalog
///
/// NextPage and PrevPage carry bindings in all three spaces, the scroll
/// commands a cloneable parameter.
pub(crate) fn shared_catalog() -> Rc<RefCell<CommandCatalog>> {
    let define = |name: &str, group: &str, keys: &str, pointer: &str, touch: &str| {
        CommandDefinition::new(name, group, name, NoActions.action_for(name))
            .with_bindings(CommandBindings::parse(keys, pointer, touch).unwrap())
    };
    let scroll = CommandParameter::ViewScroll {
        scroll: 25,
        allow_cross_scroll: true,
    };

    let catalog = CommandCatalog::from_definitions([
        define("NextPage", "Move", "Right", "L", "TouchL1"),
        define("PrevPage", "Move", "Left", "R", "TouchR1"),
        define("ViewScrollUp", "View", "Up", "", "")
            .with_parameter(scroll.clone())
            .cloneable(),
        define("ViewScrollDown", "View", "Down", "", "")
            .with_parameter(scroll)
            .cloneable(),
        define("OpenFile", "File", "Ctrl+O", "", ""),
    ])
    .unwrap();

    Rc::new(RefCell::new(catalog))
}
