use super::writer::PumlWriter;
use super::RenderPlan;

pub(super) fn write(w: &mut PumlWriter, plan: &RenderPlan<'_, '_>) {
    w.blank();
    if let Some(legend) = plan.scene.directive.legend.directive() {
        w.line(legend);
    }
    w.line("@enduml");
}
