//! Built-in scene directors.
//!
//! Each director assembles the stack diagram and code panels into a full
//! composition and scripts a fixed entrance sequence. All text and numbers
//! are hard-coded; a director invoked twice produces identical scenes.

pub mod call_frame;
pub mod memory_layout;

use crate::foundation::error::StackshowResult;
use crate::scene::scene::Scene;

/// The x86 listing for `add`, shared by both scenes.
///
/// The operand comments mark where `a`, `b` and `c` live relative to EBP.
pub(crate) const ADD_ASM: &str = concat!(
    "push    ebp\n",
    "mov     ebp, esp\n",
    "sub     esp, 0x10\n",
    "\n",
    "mov     eax, DWORD PTR [ebp+0xC]    ; b\n",
    "mov     edx, DWORD PTR [ebp+0x8]    ; a\n",
    "lea     eax, [edx+eax*1]            ; a+b\n",
    "mov     DWORD PTR [ebp-0x4], eax    ; c\n",
    "mov     eax, DWORD PTR [ebp-0x4]\n",
    "leave\n",
    "ret",
);

/// One registered scene.
pub struct SceneEntry {
    /// CLI name.
    pub name: &'static str,
    /// One-line description for `stackshow list`.
    pub summary: &'static str,
    /// Director function.
    pub build: fn() -> StackshowResult<Scene>,
}

/// All built-in scenes, in presentation order.
pub fn all() -> &'static [SceneEntry] {
    &[
        SceneEntry {
            name: "memory-layout",
            summary: "stack region between high and low memory, with source and assembly",
            build: memory_layout::build,
        },
        SceneEntry {
            name: "call-frame",
            summary: "one add(8, 4) frame with ESP/EBP pointers into the cells",
            build: call_frame::build,
        },
    ]
}

/// Look up a scene by CLI name.
pub fn by_name(name: &str) -> Option<&'static SceneEntry> {
    all().iter().find(|entry| entry.name == name)
}
