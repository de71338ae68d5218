//! Action dispatch: turns a tagged `computer_13` action into the
//! `pyautogui` code string the guest's `/execute` endpoint expects, or a
//! `CodeBlock` straight through to `/execute_windows`. Grounded on
//! `PythonController.execute_action` in `controllers/python.py`.

use crate::error::{Error, Result};
use deskarena_types::action::{Action, Computer13Action, Computer13Kind};
use serde_json::Value;

/// The fixed keyboard vocabulary `pyautogui` accepts, lower-cased.
/// Mirrors `pyautogui.KEYBOARD_KEYS`.
pub const KEYBOARD_KEYS: &[&str] = &[
    "\t", "\n", "\r", " ", "!", "\"", "#", "$", "%", "&", "'", "(", ")", "*", "+", ",", "-", ".",
    "/", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", ":", ";", "<", "=", ">", "?", "@", "[",
    "\\", "]", "^", "_", "`", "{", "|", "}", "~", "accept", "add", "alt", "altleft", "altright",
    "apps", "backspace", "browserback", "browserfavorites", "browserforward", "browserhome",
    "browserrefresh", "browsersearch", "browserstop", "capslock", "clear", "convert", "ctrl",
    "ctrlleft", "ctrlright", "decimal", "del", "delete", "divide", "down", "end", "enter", "esc",
    "escape", "execute", "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
    "f13", "f14", "f15", "f16", "f17", "f18", "f19", "f20", "f21", "f22", "f23", "f24", "final",
    "fn", "hanguel", "hangul", "hanja", "help", "home", "insert", "junja", "kana", "kanji", "left",
    "modechange", "multiply", "nexttrack", "nonconvert", "num0", "num1", "num2", "num3", "num4",
    "num5", "num6", "num7", "num8", "num9", "numlock", "pagedown", "pageup", "pause", "pgdn",
    "pgup", "playpause", "prevtrack", "print", "printscreen", "prntscrn", "prtsc", "prtscr",
    "return", "right", "scrolllock", "select", "separator", "shift", "shiftleft", "shiftright",
    "sleep", "space", "stop", "subtract", "tab", "up", "volumedown", "volumemute", "volumeup",
    "win", "winleft", "winright", "yen", "command", "option", "optionleft", "optionright",
];

fn validate_key(key: &str) -> Result<()> {
    if KEYBOARD_KEYS.contains(&key.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(Error::UnknownKey(key.to_string()))
    }
}

fn get_f64(params: &Value, key: &str) -> Option<f64> {
    params.get(key).and_then(Value::as_f64)
}

fn get_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Renders a single `computer_13` action to a `pyautogui` source fragment.
/// Returns `None` for `WAIT`/`FAIL`/`DONE`, which never reach the wire.
pub fn render_pyautogui(action: &Computer13Action) -> Result<Option<String>> {
    let p = &action.parameters;
    let code = match action.action_type {
        Computer13Kind::MoveTo => match (get_f64(p, "x"), get_f64(p, "y")) {
            (Some(x), Some(y)) => format!("pyautogui.moveTo({x}, {y})"),
            _ => "pyautogui.moveTo()".to_string(),
        },
        Computer13Kind::Click => {
            let button = get_str(p, "button");
            let clicks = get_f64(p, "num_clicks").map(|n| n as i64);
            match (button, get_f64(p, "x"), get_f64(p, "y")) {
                (Some(b), Some(x), Some(y)) => match clicks {
                    Some(n) => format!("pyautogui.click(button='{b}', x={x}, y={y}, clicks={n})"),
                    None => format!("pyautogui.click(button='{b}', x={x}, y={y})"),
                },
                (Some(b), None, None) => match clicks {
                    Some(n) => format!("pyautogui.click(button='{b}', clicks={n})"),
                    None => format!("pyautogui.click(button='{b}')"),
                },
                (None, Some(x), Some(y)) => match clicks {
                    Some(n) => format!("pyautogui.click(x={x}, y={y}, clicks={n})"),
                    None => format!("pyautogui.click(x={x}, y={y})"),
                },
                _ => "pyautogui.click()".to_string(),
            }
        }
        Computer13Kind::MouseDown => match get_str(p, "button") {
            Some(b) => format!("pyautogui.mouseDown(button='{b}')"),
            None => "pyautogui.mouseDown()".to_string(),
        },
        Computer13Kind::MouseUp => match get_str(p, "button") {
            Some(b) => format!("pyautogui.mouseUp(button='{b}')"),
            None => "pyautogui.mouseUp()".to_string(),
        },
        Computer13Kind::RightClick => match (get_f64(p, "x"), get_f64(p, "y")) {
            (Some(x), Some(y)) => format!("pyautogui.rightClick(x={x}, y={y})"),
            _ => "pyautogui.rightClick()".to_string(),
        },
        Computer13Kind::DoubleClick => match (get_f64(p, "x"), get_f64(p, "y")) {
            (Some(x), Some(y)) => format!("pyautogui.doubleClick(x={x}, y={y})"),
            _ => "pyautogui.doubleClick()".to_string(),
        },
        Computer13Kind::Drag => match (get_f64(p, "x"), get_f64(p, "y")) {
            (Some(x), Some(y)) => {
                format!("pyautogui.dragTo({x}, {y}, duration=1.0, button='left', mouseDownUp=True)")
            }
            _ => return Err(Error::GuestApplication("drag requires x and y parameters".to_string())),
        },
        Computer13Kind::Scroll => {
            let dx = get_f64(p, "dx");
            let dy = get_f64(p, "dy");
            match (dx, dy) {
                (Some(dx), Some(dy)) => format!("pyautogui.hscroll({dx}); pyautogui.vscroll({dy})"),
                (Some(dx), None) => format!("pyautogui.hscroll({dx})"),
                (None, Some(dy)) => format!("pyautogui.vscroll({dy})"),
                (None, None) => {
                    return Err(Error::GuestApplication("scroll requires dx and/or dy".to_string()));
                }
            }
        }
        Computer13Kind::TypeText => {
            let text = get_str(p, "text")
                .ok_or_else(|| Error::GuestApplication("typing requires a text parameter".to_string()))?;
            format!("pyautogui.typewrite({:?})", text)
        }
        Computer13Kind::KeyPress => {
            let key = get_str(p, "key")
                .ok_or_else(|| Error::GuestApplication("press requires a key parameter".to_string()))?;
            validate_key(key)?;
            format!("pyautogui.press('{key}')")
        }
        Computer13Kind::KeyDown => {
            let key = get_str(p, "key")
                .ok_or_else(|| Error::GuestApplication("key_down requires a key parameter".to_string()))?;
            validate_key(key)?;
            format!("pyautogui.keyDown('{key}')")
        }
        Computer13Kind::KeyUp => {
            let key = get_str(p, "key")
                .ok_or_else(|| Error::GuestApplication("key_up requires a key parameter".to_string()))?;
            validate_key(key)?;
            format!("pyautogui.keyUp('{key}')")
        }
        Computer13Kind::Hotkey => {
            let keys = p
                .get("keys")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::GuestApplication("hotkey requires a keys list".to_string()))?;
            let mut names = Vec::with_capacity(keys.len());
            for key in keys {
                let key = key
                    .as_str()
                    .ok_or_else(|| Error::GuestApplication("hotkey keys must be strings".to_string()))?;
                validate_key(key)?;
                names.push(key.to_string());
            }
            format!("pyautogui.hotkey('{}')", names.join("', '"))
        }
    };
    Ok(Some(code))
}

/// Turns a full `Action` into the code string to forward to the guest, or
/// `None` for the terminal sentinels (`WAIT`/`FAIL`/`DONE`), which the
/// engine handles locally without a round trip.
pub fn render_action(action: &Action) -> Result<Option<String>> {
    match action {
        Action::Wait | Action::Fail | Action::Done => Ok(None),
        Action::Computer13(inner) => render_pyautogui(inner),
        Action::Pyautogui(code) => Ok(Some(code.clone())),
        Action::CodeBlock(code) => Ok(Some(code.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(kind: Computer13Kind, parameters: Value) -> Computer13Action {
        Computer13Action { action_type: kind, parameters }
    }

    #[test]
    fn move_to_with_coordinates() {
        let a = action(Computer13Kind::MoveTo, json!({"x": 10.0, "y": 20.0}));
        assert_eq!(render_pyautogui(&a).unwrap().unwrap(), "pyautogui.moveTo(10, 20)");
    }

    #[test]
    fn press_rejects_unknown_key() {
        let a = action(Computer13Kind::KeyPress, json!({"key": "nonsense_key"}));
        assert!(matches!(render_pyautogui(&a), Err(Error::UnknownKey(_))));
    }

    #[test]
    fn hotkey_validates_every_key() {
        let a = action(Computer13Kind::Hotkey, json!({"keys": ["ctrl", "c"]}));
        assert_eq!(render_pyautogui(&a).unwrap().unwrap(), "pyautogui.hotkey('ctrl', 'c')");
    }

    #[test]
    fn terminal_sentinels_render_to_none() {
        assert!(render_action(&Action::Done).unwrap().is_none());
        assert!(render_action(&Action::Wait).unwrap().is_none());
    }
}
